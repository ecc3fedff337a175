//! Display colors for the known parties, for downstream plotting.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Fallback for parties without an entry in the table.
pub const DEFAULT_PARTY_COLOR: &str = "#777777";

static PARTY_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("III. Weg", "#1d542c"),
        ("AfD", "#009ee0"),
        ("B*", "#019889"),
        ("dieBasis", "#4d4c4d"),
        ("BIG", "#ed8045"),
        ("BIW", "#005ab0"),
        ("BP", "#7FFFFF"),
        ("BÜNDNIS21", "#e81972"),
        ("Bündnis C", "#0872ba"),
        ("BÜRGERBEWEGUNG", "#f07e18"),
        ("BüSo", "#1f4569"),
        ("CDU", "#000000"),
        ("CDU / CSU", "#000000"),
        ("CSU", "#000000"),
        ("DiB", "#854d68"),
        ("DKP", "#ed1c24"),
        ("DSP", "#a1b45a"),
        ("FAMILIE", "#ff6600"),
        ("FBM", "#ff9b30"),
        ("FDP", "#ffff00"),
        ("FREIE WÄHLER", "#FF8000"),
        ("Die Grauen", "#9e9e9e"),
        ("Graue Panther", "#6b6b6b"),
        ("GRÜNE", "#46962b"),
        ("Die Humanisten", "#2191BD"),
        ("Die Humanisten Niedersachsen", "#2191BD"),
        ("Klimaliste Berlin", "#5cc14c"),
        ("Klimaliste ST", "#5cc14c"),
        ("LfK", "#d2175e"),
        ("LIEBE", "#db3028"),
        ("DIE LINKE", "#BE3075"),
        ("DIE LINKE.", "#BE3075"),
        ("LKR", "#f39200"),
        ("MENSCHLICHE WELT", "#f26f22"),
        ("MIETERPARTEI", "#002b83"),
        ("MLPD", "#ed1c24"),
        ("neo", "#a5d839"),
        ("NPD", "#8b4726"),
        ("ÖDP", "#ff6400"),
        ("Die PARTEI", "#b5152b"),
        ("PdF", "#f5a612"),
        ("PIRATEN", "#ff820a"),
        ("REP", "#0075BE"),
        ("SGP", "#B70E0C"),
        ("SPD", "#E3000F"),
        ("SSW", "#003c8f"),
        ("Tierschutzpartei", "#006D77"),
        ("Team Todenhöfer", "#20274d"),
        ("UNABHÄNGIGE", "#ff9900"),
        ("du.", "#ff9700"),
        ("Die Urbane.", "#ff9700"),
        ("V-Partei³", "#a1bf14"),
        ("DIE VIOLETTEN", "#621c75"),
        ("Volt", "#562883"),
        ("WiR2020", "#496164"),
        ("Z.", "#005a62"),
        ("ZENTRUM", "#0000CD"),
    ])
});

/// The display color for a party name, falling back to
/// [`DEFAULT_PARTY_COLOR`] for unknown names.
pub fn party_color(name: &str) -> &'static str {
    PARTY_COLORS.get(name).copied().unwrap_or(DEFAULT_PARTY_COLOR)
}
