//! Registry of the known dataset archives, keyed by election date and
//! federal state code. Built once, never mutated.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub static ELECTION_FILES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "2021-06-06_st",
            "https://www.bpb.de/system/files/datei/Wahl-O-Mat%20Sachsen-Anhalt%202021_Datensatz_v1.03_0.zip",
        ),
        (
            "2021-09-26_de",
            "https://www.bpb.de/system/files/datei/Wahl-O-Mat%20Bundestag%202021_Datensatz_v1.02.zip",
        ),
        // 2021-09-26_mv and 2022-03-27_sl are published but the archives
        // are corrupted, so they are not listed here.
        (
            "2022-05-08_sh",
            "https://www.bpb.de/system/files/datei/Wahl-O-Mat_Schleswig-Holstein_2022_Datensatz_v1.02.zip",
        ),
        (
            "2022-05-15_nw",
            "https://www.bpb.de/system/files/datei/Wahl-O-Mat_Nordrhein-Westfalen_2022_Datensatz_v1.02.zip",
        ),
        (
            "2022-10-09_ni",
            "https://www.bpb.de/system/files/datei/Wahl-O-Mat_Niedersachsen_2022_Datensatz_v1.01.zip",
        ),
        (
            "2023-02-12_be",
            "https://www.bpb.de/system/files/datei/Wahl-O-Mat_Berlin_2023_Datensatz.zip",
        ),
        (
            "2023-05-14_hb",
            "https://www.bpb.de/system/files/datei/Wahl-O-Mat_Bremen_2023_Datensatz_v1.01.zip",
        ),
    ])
});

/// Resolves an election key to its archive URL. Unknown keys pass through
/// unchanged, so callers can hand a raw URL directly to the loader.
pub fn election_url(election: &str) -> &str {
    ELECTION_FILES.get(election).copied().unwrap_or(election)
}
