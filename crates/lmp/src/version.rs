//! Engine-version resolution and the version-dependent command policy.

use std::{path::Path, process::Command, sync::OnceLock};

use jiff::civil::Date;
use regex::Regex;

use crate::LammpsError;

/// release in which LAMMPS stopped enforcing the default tilt-factor limit,
/// making `box tilt large` unnecessary
fn tilt_limit_removed() -> Date {
    jiff::civil::date(2022, 12, 22)
}

/// Command-syntax flags for one engine release, looked up once per handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Syntax {
    /// emit `box tilt large` before box creation
    pub box_tilt_large: bool,
}

impl Syntax {
    /// resolve the flags for a release date. a release exactly on a
    /// boundary gets the newer behavior
    pub fn for_date(date: Date) -> Self {
        Self {
            box_tilt_large: date < tilt_limit_removed(),
        }
    }
}

/// Convert the `yyyymmdd` integer reported by a library session into a date.
pub fn version_date(version: i64) -> Result<Date, LammpsError> {
    let (y, m, d) = (version / 10000, (version / 100) % 100, version % 100);
    Date::new(y as i16, m as i8, d as i8)
        .map_err(|_| LammpsError::VersionUnresolved(version.to_string()))
}

static BANNER: OnceLock<Regex> = OnceLock::new();

/// extract the release date from a LAMMPS banner or help header, e.g.
/// `LAMMPS (23 Jun 2022)`
pub(crate) fn parse_banner(text: &str) -> Option<Date> {
    let re = BANNER
        .get_or_init(|| Regex::new(r"\d{1,2} [A-Z][a-z]{2} \d{4}").unwrap());
    let m = re.find(text)?;
    Date::strptime("%d %b %Y", m.as_str()).ok()
}

/// Resolve the release date of a LAMMPS executable from its help output.
/// Failure here is fatal to the caller; it is never retried.
pub fn check_version(exe: impl AsRef<Path>) -> Result<Date, LammpsError> {
    let exe = exe.as_ref();
    let out = Command::new(exe).arg("-h").output().map_err(|e| {
        LammpsError::Spawn(exe.display().to_string(), e.kind())
    })?;
    let text = String::from_utf8_lossy(&out.stdout);
    parse_banner(&text)
        .ok_or_else(|| LammpsError::VersionUnresolved(exe.display().to_string()))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(20221221, true ; "day before")]
    #[test_case(20221222, false ; "on the boundary")]
    #[test_case(20240101, false ; "well after")]
    #[test_case(20210929, true ; "well before")]
    fn tilt_policy(version: i64, want: bool) {
        let date = version_date(version).unwrap();
        assert_eq!(Syntax::for_date(date).box_tilt_large, want);
    }

    #[test]
    fn version_date_valid() {
        assert_eq!(
            version_date(20220623).unwrap(),
            jiff::civil::date(2022, 6, 23)
        );
    }

    #[test]
    fn version_date_invalid() {
        assert_eq!(
            version_date(20220001),
            Err(LammpsError::VersionUnresolved("20220001".to_string()))
        );
    }

    #[test]
    fn banner() {
        assert_eq!(
            parse_banner("LAMMPS (23 Jun 2022)"),
            Some(jiff::civil::date(2022, 6, 23))
        );
        assert_eq!(
            parse_banner(
                "Large-scale Atomic/Molecular Massively Parallel Simulator - \
                 29 Sep 2021 - Update 2"
            ),
            Some(jiff::civil::date(2021, 9, 29))
        );
        assert_eq!(parse_banner("no date here"), None);
    }

    #[test]
    fn missing_executable() {
        assert!(matches!(
            check_version("/no/such/lammps"),
            Err(LammpsError::Spawn(_, _))
        ));
    }
}
