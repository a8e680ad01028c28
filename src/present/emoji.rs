use std::collections::BTreeMap;

/// Badges of well-known config names.
const KNOWN_CONFIG_EMOJIS: &[(&str, &str)] = &[
    ("recommended", "✅"),
    ("recommended-type-checked", "☑️"),
    ("strict", "🔒"),
    ("strict-type-checked", "🔐"),
    ("all", "🌐"),
    ("stylistic", "🎨"),
    ("stylistic-type-checked", "🖌️"),
    ("errors", "❌"),
    ("warnings", "⚠️"),
    ("typescript", "⌨️"),
    ("react", "⚛️"),
    ("jsx-runtime", "⚛️"),
    ("prettier", "💅"),
    ("disable-type-checked", "🚫"),
    ("eslint-recommended", "📐"),
    ("base", "🧱"),
];

/// Cycled, in sorted-name order, across names without a fixed badge.
pub const CONFIG_EMOJI_PALETTE: &[&str] = &[
    "🟠", "🟡", "🟢", "🔵", "🟣", "🟤", "🔴", "🔶", "🔷", "🔸", "🔹", "⭐",
];

/// Badge per distinct config name.
///
/// Output is a function of the set of names only: input order and duplicates
/// do not change the assignment.
pub fn config_emojis<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, &'static str> {
    let mut out = BTreeMap::new();
    let mut unknown: Vec<&str> = Vec::new();

    for name in names {
        if out.contains_key(name) || unknown.contains(&name) {
            continue;
        }
        match KNOWN_CONFIG_EMOJIS.iter().find(|(known, _)| *known == name) {
            Some((_, emoji)) => {
                out.insert(name.to_string(), *emoji);
            }
            None => unknown.push(name),
        }
    }

    unknown.sort_unstable();
    for (i, name) in unknown.into_iter().enumerate() {
        out.insert(name.to_string(), CONFIG_EMOJI_PALETTE[i % CONFIG_EMOJI_PALETTE.len()]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_get_fixed_badges() {
        let emojis = config_emojis(["strict", "recommended"]);
        assert_eq!(emojis["recommended"], "✅");
        assert_eq!(emojis["strict"], "🔒");
    }

    #[test]
    fn unknown_names_cycle_in_sorted_order() {
        let a = config_emojis(["zeta", "recommended", "alpha", "mid"]);
        let b = config_emojis(["mid", "alpha", "zeta", "alpha"]);

        assert_eq!(a["alpha"], CONFIG_EMOJI_PALETTE[0]);
        assert_eq!(a["mid"], CONFIG_EMOJI_PALETTE[1]);
        assert_eq!(a["zeta"], CONFIG_EMOJI_PALETTE[2]);
        assert_eq!(a["alpha"], b["alpha"]);
        assert_eq!(a["zeta"], b["zeta"]);
    }

    #[test]
    fn palette_wraps_around() {
        let names: Vec<String> = (0..CONFIG_EMOJI_PALETTE.len() + 1)
            .map(|i| format!("cfg-{i:02}"))
            .collect();
        let emojis = config_emojis(names.iter().map(String::as_str));
        assert_eq!(emojis["cfg-00"], emojis[names.last().unwrap().as_str()]);
    }
}
