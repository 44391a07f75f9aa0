use std::ffi::OsString;
use std::fmt;
use std::process::{Command, Stdio};

use crate::config::{PlayerConfig, StreamHelperConfig};
use crate::platform::SpawnConfig;

/// Token the stream helper replaces with its own stream input.
pub const PLAYER_INPUT_TOKEN: &str = "{playerinput}";

/// Stops the player from reading a URL that starts with `-` as a flag.
pub const END_OF_OPTIONS: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Hand the URL to the stream helper, which feeds the player.
    LiveStream,
    /// Open the URL in the player directly.
    DirectPlayer,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiveStream => write!(f, "live-stream"),
            Self::DirectPlayer => write!(f, "direct-player"),
        }
    }
}

/// A fully resolved command line, consumed once by a launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub strategy: Strategy,
    pub executable: OsString,
    pub arguments: Vec<OsString>,
    pub spawn: SpawnConfig,
}

impl LaunchPlan {
    /// `<player> <no-ui flag> <options...> -- [url]`.
    ///
    /// Without a URL nothing follows `--`.
    pub fn direct_player(
        player: &PlayerConfig,
        url: Option<&str>,
        options: &[String],
        spawn: SpawnConfig,
    ) -> Self {
        let mut arguments = Vec::with_capacity(options.len() + 3);
        arguments.push(OsString::from(&player.no_ui_flag));
        arguments.extend(options.iter().map(OsString::from));
        arguments.push(OsString::from(END_OF_OPTIONS));
        arguments.extend(url.map(OsString::from));

        Self {
            strategy: Strategy::DirectPlayer,
            executable: OsString::from(&player.executable),
            arguments,
            spawn,
        }
    }

    /// `<helper> --player <player> --player-args "<no-ui flag> {playerinput}" <url> <quality>`.
    pub fn live_stream(
        helper: &StreamHelperConfig,
        player: &PlayerConfig,
        player_path: OsString,
        url: &str,
        spawn: SpawnConfig,
    ) -> Self {
        let player_args = format!("{} {PLAYER_INPUT_TOKEN}", player.no_ui_flag);
        let arguments = vec![
            OsString::from("--player"),
            player_path,
            OsString::from("--player-args"),
            OsString::from(player_args),
            OsString::from(url),
            OsString::from(&helper.quality),
        ];

        Self {
            strategy: Strategy::LiveStream,
            executable: OsString::from(&helper.executable),
            arguments,
            spawn,
        }
    }

    /// Build the process command. The child gets no stdin or stdout, so it
    /// cannot write into the messaging pipe.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        if let Some(path) = &self.spawn.search_path {
            cmd.env("PATH", path);
        }
        apply_creation_flags(&mut cmd, &self.spawn);
        cmd
    }
}

#[cfg(target_os = "windows")]
fn apply_creation_flags(cmd: &mut Command, spawn: &SpawnConfig) {
    use std::os::windows::process::CommandExt;
    use windows::Win32::System::Threading::CREATE_BREAKAWAY_FROM_JOB;

    if spawn.detach_from_job {
        cmd.creation_flags(CREATE_BREAKAWAY_FROM_JOB.0);
    }
}

#[cfg(not(target_os = "windows"))]
fn apply_creation_flags(_cmd: &mut Command, _spawn: &SpawnConfig) {}
