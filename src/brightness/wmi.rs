//! WMI brightness provider
//!
//! Laptop panels expose brightness through the `root/WMI` namespace
//! (`WmiMonitorBrightness` for reading, `WmiMonitorBrightnessMethods` for
//! writing). The classes are reached through PowerShell's CIM cmdlets, which
//! ship with every supported Windows release.
//!
//! External monitors usually have no WMI provider; [`WmiBrightness::probe`]
//! fails for them and the session runs without dimming.

use std::process::{Command, Stdio};

use tracing::{debug, trace};

use super::error::{BrightnessError, Result};
use super::BrightnessControl;

/// Hide the console window of the spawned shell
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

const QUERY_SCRIPT: &str = "(Get-CimInstance -Namespace root/WMI -ClassName WmiMonitorBrightness \
     -ErrorAction Stop | Select-Object -First 1).CurrentBrightness";

/// Brightness through WMI
#[derive(Debug, Clone)]
pub struct WmiBrightness {
    shell: String,
}

impl WmiBrightness {
    /// Check that a WMI brightness provider answers
    pub fn probe() -> Result<Self> {
        let provider = Self {
            shell: "powershell.exe".to_string(),
        };
        match provider.current() {
            Ok(level) => {
                debug!("WMI brightness provider available (current {}%)", level);
                Ok(provider)
            }
            Err(e) => Err(BrightnessError::Unavailable(e.to_string())),
        }
    }

    fn run(&self, script: &str) -> Result<String> {
        trace!("powershell: {}", script);

        let mut command = Command::new(&self.shell);
        command
            .args(["-NoProfile", "-NonInteractive", "-Command", script])
            .stdin(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BrightnessError::Query(format!(
                "{} exited with {}: {}",
                self.shell,
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl BrightnessControl for WmiBrightness {
    fn current(&self) -> Result<u8> {
        let output = self.run(QUERY_SCRIPT)?;
        parse_level(&output)
    }

    fn set(&self, level: u8) -> Result<()> {
        let level = level.min(100);
        self.run(&set_script(level))
            .map(|_| ())
            .map_err(|e| BrightnessError::Set {
                level,
                reason: e.to_string(),
            })
    }
}

/// Script applying `level` to every WMI-controllable panel
fn set_script(level: u8) -> String {
    format!(
        "Get-CimInstance -Namespace root/WMI -ClassName WmiMonitorBrightnessMethods \
         -ErrorAction Stop | Invoke-CimMethod -MethodName WmiSetBrightness \
         -Arguments @{{Timeout=0;Brightness={level}}} | Out-Null"
    )
}

/// Parse the first non-empty line of the query output as a percentage
fn parse_level(output: &str) -> Result<u8> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| BrightnessError::Query("provider returned no value".to_string()))?;

    match line.parse::<u8>() {
        Ok(level) if level <= 100 => Ok(level),
        _ => Err(BrightnessError::InvalidOutput(line.to_string())),
    }
}
