use crate::config::{parse_altitude, ProbeConfig};
use crate::error::ProbeError;

pub const USAGE: &str = "\
Usage: sysmon-probe [--json] [--list] [--altitude <N>] [--name <NAME>]

  --json            print the result as a JSON document
  --list            print every loaded filter before the verdict
  --altitude <N>    altitude of the driver under test (default 385201)
  --name <NAME>     default load name of that driver (default SysmonDrv)
  -h, --help        show this help

Environment: PROBE_TARGET_ALTITUDE, PROBE_DEFAULT_NAME, PROBE_DRIVER_LABEL,
PROBE_INITIAL_BUFFER, RUST_LOG";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProbeArgs {
    pub json: bool,
    pub list: bool,
    pub help: bool,
    pub altitude: Option<i32>,
    pub name: Option<String>,
}

impl ProbeArgs {
    /// Command-line values win over the configured ones.
    pub fn apply(&self, cfg: &mut ProbeConfig) {
        if let Some(altitude) = self.altitude {
            cfg.target_altitude = altitude;
        }
        if let Some(name) = &self.name {
            cfg.default_name = name.clone();
        }
    }
}

pub fn parse_args<I>(mut it: I) -> Result<ProbeArgs, ProbeError>
where
    I: Iterator<Item = String>,
{
    let mut args = ProbeArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--json" => args.json = true,
            "--list" => args.list = true,
            "-h" | "--help" => args.help = true,
            "--altitude" => {
                let raw = it
                    .next()
                    .ok_or_else(|| ProbeError::Args("--altitude requires a value".to_string()))?;
                args.altitude = Some(parse_altitude("--altitude", &raw)?);
            }
            "--name" => {
                let name = it
                    .next()
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| ProbeError::Args("--name requires a value".to_string()))?;
                args.name = Some(name);
            }
            other => {
                return Err(ProbeError::Args(format!(
                    "unknown argument: {other}\n\n{USAGE}"
                )))
            }
        }
    }

    Ok(args)
}
