//! Canonical team identities and alias normalization

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Canonical 3-letter code for each franchise, plus a sentinel for
/// anything the alias table cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TeamCode {
    Atl,
    Bos,
    Brk,
    Cho,
    Chi,
    Cle,
    Dal,
    Den,
    Det,
    Gsw,
    Hou,
    Ind,
    Lac,
    Lal,
    Mem,
    Mia,
    Mil,
    Min,
    Nop,
    Nyk,
    Okc,
    Orl,
    Phi,
    Pho,
    Por,
    Sac,
    Sas,
    Tor,
    Uta,
    Was,
    Unknown,
}

impl TeamCode {
    /// All 30 canonical codes, excluding the sentinel.
    pub const ALL: [TeamCode; 30] = [
        TeamCode::Atl,
        TeamCode::Bos,
        TeamCode::Brk,
        TeamCode::Cho,
        TeamCode::Chi,
        TeamCode::Cle,
        TeamCode::Dal,
        TeamCode::Den,
        TeamCode::Det,
        TeamCode::Gsw,
        TeamCode::Hou,
        TeamCode::Ind,
        TeamCode::Lac,
        TeamCode::Lal,
        TeamCode::Mem,
        TeamCode::Mia,
        TeamCode::Mil,
        TeamCode::Min,
        TeamCode::Nop,
        TeamCode::Nyk,
        TeamCode::Okc,
        TeamCode::Orl,
        TeamCode::Phi,
        TeamCode::Pho,
        TeamCode::Por,
        TeamCode::Sac,
        TeamCode::Sas,
        TeamCode::Tor,
        TeamCode::Uta,
        TeamCode::Was,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamCode::Atl => "ATL",
            TeamCode::Bos => "BOS",
            TeamCode::Brk => "BRK",
            TeamCode::Cho => "CHO",
            TeamCode::Chi => "CHI",
            TeamCode::Cle => "CLE",
            TeamCode::Dal => "DAL",
            TeamCode::Den => "DEN",
            TeamCode::Det => "DET",
            TeamCode::Gsw => "GSW",
            TeamCode::Hou => "HOU",
            TeamCode::Ind => "IND",
            TeamCode::Lac => "LAC",
            TeamCode::Lal => "LAL",
            TeamCode::Mem => "MEM",
            TeamCode::Mia => "MIA",
            TeamCode::Mil => "MIL",
            TeamCode::Min => "MIN",
            TeamCode::Nop => "NOP",
            TeamCode::Nyk => "NYK",
            TeamCode::Okc => "OKC",
            TeamCode::Orl => "ORL",
            TeamCode::Phi => "PHI",
            TeamCode::Pho => "PHO",
            TeamCode::Por => "POR",
            TeamCode::Sac => "SAC",
            TeamCode::Sas => "SAS",
            TeamCode::Tor => "TOR",
            TeamCode::Uta => "UTA",
            TeamCode::Was => "WAS",
            TeamCode::Unknown => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TeamCode::Unknown)
    }
}

impl fmt::Display for TeamCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeamCode {
    type Err = ();

    /// Strict parse of a canonical code. Alias resolution lives in
    /// [`TeamNormalizer`]; this only accepts the 30 canonical spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TeamCode::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or(())
    }
}

/// Total mapping from any known team spelling to its canonical code.
///
/// The alias table is fixed at construction; there is no way to mutate it
/// afterwards. Unknown input resolves to [`TeamCode::Unknown`] instead of
/// failing, so callers can treat normalization as infallible and filter
/// sentinels where it matters.
#[derive(Debug, Clone)]
pub struct TeamNormalizer {
    aliases: HashMap<String, TeamCode>,
}

impl Default for TeamNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamNormalizer {
    pub fn new() -> Self {
        let mut aliases = HashMap::new();

        // Canonical codes resolve to themselves.
        for code in TeamCode::ALL {
            aliases.insert(code.as_str().to_string(), code);
        }

        // Alternate/historical 3-letter codes seen in the wild.
        for (alias, code) in [
            ("PHX", TeamCode::Pho),
            ("BKN", TeamCode::Brk),
            ("CHA", TeamCode::Cho),
            ("NO", TeamCode::Nop),
        ] {
            aliases.insert(alias.to_string(), code);
        }

        // Localized names used by the odds site, including its spelling
        // variants for Boston, Philadelphia and Portland.
        for (alias, code) in [
            ("老鷹", TeamCode::Atl),
            ("塞爾提克", TeamCode::Bos),
            ("塞爾提", TeamCode::Bos),
            ("籃網", TeamCode::Brk),
            ("黃蜂", TeamCode::Cho),
            ("公牛", TeamCode::Chi),
            ("騎士", TeamCode::Cle),
            ("獨行俠", TeamCode::Dal),
            ("金塊", TeamCode::Den),
            ("活塞", TeamCode::Det),
            ("勇士", TeamCode::Gsw),
            ("火箭", TeamCode::Hou),
            ("溜馬", TeamCode::Ind),
            ("快艇", TeamCode::Lac),
            ("湖人", TeamCode::Lal),
            ("灰熊", TeamCode::Mem),
            ("熱火", TeamCode::Mia),
            ("公鹿", TeamCode::Mil),
            ("灰狼", TeamCode::Min),
            ("鵜鶘", TeamCode::Nop),
            ("尼克", TeamCode::Nyk),
            ("雷霆", TeamCode::Okc),
            ("魔術", TeamCode::Orl),
            ("76人", TeamCode::Phi),
            ("七六人", TeamCode::Phi),
            ("太陽", TeamCode::Pho),
            ("拓荒者", TeamCode::Por),
            ("拓荒", TeamCode::Por),
            ("國王", TeamCode::Sac),
            ("馬刺", TeamCode::Sas),
            ("暴龍", TeamCode::Tor),
            ("爵士", TeamCode::Uta),
            ("巫師", TeamCode::Was),
        ] {
            aliases.insert(alias.to_string(), code);
        }

        Self { aliases }
    }

    /// Add an extra alias before first use.
    pub fn with_alias(mut self, alias: &str, code: TeamCode) -> Self {
        self.aliases.insert(alias.to_string(), code);
        self
    }

    /// Resolve a raw spelling to its canonical code. Total: never fails.
    pub fn normalize(&self, raw: &str) -> TeamCode {
        self.aliases
            .get(raw.trim())
            .copied()
            .unwrap_or(TeamCode::Unknown)
    }

    /// True if the spelling resolves to a real team.
    pub fn recognizes(&self, raw: &str) -> bool {
        self.normalize(raw).is_known()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_codes_are_idempotent() {
        let n = TeamNormalizer::new();
        for code in TeamCode::ALL {
            assert_eq!(n.normalize(code.as_str()), code);
            // A second pass through the normalizer is a no-op.
            assert_eq!(n.normalize(n.normalize(code.as_str()).as_str()), code);
        }
    }

    #[test]
    fn test_variant_codes() {
        let n = TeamNormalizer::new();
        assert_eq!(n.normalize("PHX"), TeamCode::Pho);
        assert_eq!(n.normalize("BKN"), TeamCode::Brk);
        assert_eq!(n.normalize("CHA"), TeamCode::Cho);
        assert_eq!(n.normalize("NO"), TeamCode::Nop);
    }

    #[test]
    fn test_localized_names() {
        let n = TeamNormalizer::new();
        assert_eq!(n.normalize("湖人"), TeamCode::Lal);
        assert_eq!(n.normalize("塞爾提克"), TeamCode::Bos);
        assert_eq!(n.normalize("塞爾提"), TeamCode::Bos);
        assert_eq!(n.normalize("七六人"), TeamCode::Phi);
        assert_eq!(n.normalize("76人"), TeamCode::Phi);
    }

    #[test]
    fn test_unknown_never_fails() {
        let n = TeamNormalizer::new();
        assert_eq!(n.normalize("GOTHAM"), TeamCode::Unknown);
        assert_eq!(n.normalize(""), TeamCode::Unknown);
        assert!(!n.recognizes("GOTHAM"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        let n = TeamNormalizer::new();
        assert_eq!(n.normalize("  BOS "), TeamCode::Bos);
    }

    #[test]
    fn test_extra_alias() {
        let n = TeamNormalizer::new().with_alias("GS", TeamCode::Gsw);
        assert_eq!(n.normalize("GS"), TeamCode::Gsw);
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("BOS".parse::<TeamCode>(), Ok(TeamCode::Bos));
        assert!("BKN".parse::<TeamCode>().is_err());
    }
}
