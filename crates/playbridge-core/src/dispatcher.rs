use std::env;
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::PathBuf;

use playbridge_messaging::{Channel, Request};
use tracing::{debug, info};

use crate::classify::matches_live_host;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::launcher::{Launcher, ProcessLauncher};
use crate::locate::{Locator, SearchPathLocator};
use crate::plan::{LaunchPlan, Strategy};
use crate::platform::{HostOs, SpawnConfig};
use crate::probe::{HttpLiveProbe, LiveProbe};

/// Reply sent to the browser as soon as a request is read.
pub const ACKNOWLEDGEMENT: &str = "ok";

/// The parts of the process environment the spawn rules depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub os: HostOs,
    pub path: Option<OsString>,
}

impl HostEnvironment {
    pub fn current() -> Self {
        Self {
            os: HostOs::current(),
            path: env::var_os("PATH"),
        }
    }
}

/// Handles one play request from receipt to spawn.
pub struct Dispatcher<P, L, X> {
    config: BridgeConfig,
    host: HostEnvironment,
    probe: P,
    locator: L,
    launcher: X,
}

impl Dispatcher<HttpLiveProbe, SearchPathLocator, ProcessLauncher> {
    /// Dispatcher wired to the network, the real search path and real
    /// process creation.
    pub fn from_config(config: BridgeConfig) -> Self {
        let probe = HttpLiveProbe::new(config.probe.clone());
        Self::new(
            config,
            HostEnvironment::current(),
            probe,
            SearchPathLocator,
            ProcessLauncher,
        )
    }
}

impl<P: LiveProbe, L: Locator, X: Launcher> Dispatcher<P, L, X> {
    pub fn new(
        config: BridgeConfig,
        host: HostEnvironment,
        probe: P,
        locator: L,
        launcher: X,
    ) -> Self {
        Self {
            config,
            host,
            probe,
            locator,
            launcher,
        }
    }

    /// Receive one request, acknowledge it, then plan and launch.
    ///
    /// The acknowledgement goes out before any lookup, probe or spawn, so a
    /// failed launch still reads as success on the browser side.
    pub fn run<R: Read, W: Write>(
        &self,
        channel: &mut Channel<R, W>,
    ) -> Result<Strategy, BridgeError> {
        let request = channel.receive()?;
        info!(
            url = request.url.as_deref().unwrap_or("<none>"),
            options = request.options().len(),
            "Received play request"
        );

        channel.send(ACKNOWLEDGEMENT)?;

        let plan = self.plan(&request);
        let strategy = plan.strategy;
        self.launcher.launch(plan)?;
        Ok(strategy)
    }

    /// Spawn rules for this host.
    pub fn spawn_config(&self) -> SpawnConfig {
        SpawnConfig::for_host(
            self.host.os,
            self.host.path.as_deref(),
            &self.config.platform,
        )
    }

    /// Decide how to play `request`. Always yields a plan.
    pub fn plan(&self, request: &Request) -> LaunchPlan {
        let spawn = self.spawn_config();
        let player = &self.config.player;

        match self.live_stream_url(request, &spawn) {
            Some(url) => {
                let player_path = self
                    .locate(&player.executable, &spawn)
                    .map(PathBuf::into_os_string)
                    .unwrap_or_else(|| OsString::from(&player.executable));
                info!(url, "Playing live stream through helper");
                LaunchPlan::live_stream(
                    &self.config.stream_helper,
                    player,
                    player_path,
                    url,
                    spawn,
                )
            }
            None => {
                LaunchPlan::direct_player(player, request.url.as_deref(), request.options(), spawn)
            }
        }
    }

    /// The URL, if every live-stream condition holds. The probe runs last,
    /// only once the cheap checks pass.
    fn live_stream_url<'r>(&self, request: &'r Request, spawn: &SpawnConfig) -> Option<&'r str> {
        let url = request.url.as_deref()?;
        let helper = &self.config.stream_helper;

        if !matches_live_host(url, &helper.live_hosts) {
            return None;
        }
        if self.locate(&helper.executable, spawn).is_none() {
            debug!(helper = %helper.executable, "Stream helper not installed");
            return None;
        }

        let liveness = self.probe.probe(url);
        debug!(url, ?liveness, "Live probe finished");
        liveness.is_live().then_some(url)
    }

    fn locate(&self, program: &str, spawn: &SpawnConfig) -> Option<PathBuf> {
        self.locator.locate(program, spawn.search_path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::ffi::OsStr;
    use std::io::{self, Cursor};
    use std::rc::Rc;

    use super::*;
    use crate::probe::Liveness;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Writer that logs "ack" for every flushed frame.
    struct RecordingWriter {
        log: Log,
        bytes: Rc<RefCell<Vec<u8>>>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.log.borrow_mut().push("ack");
            Ok(())
        }
    }

    struct FakeProbe {
        liveness: Liveness,
        log: Log,
    }

    impl LiveProbe for FakeProbe {
        fn probe(&self, _url: &str) -> Liveness {
            self.log.borrow_mut().push("probe");
            self.liveness
        }
    }

    struct FakeLocator {
        installed: Vec<&'static str>,
        log: Log,
        search_paths: Rc<RefCell<Vec<Option<OsString>>>>,
    }

    impl Locator for FakeLocator {
        fn locate(&self, program: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
            self.log.borrow_mut().push("locate");
            self.search_paths
                .borrow_mut()
                .push(search_path.map(OsStr::to_os_string));
            self.installed
                .iter()
                .any(|installed| *installed == program)
                .then(|| PathBuf::from(format!("/usr/bin/{program}")))
        }
    }

    struct FakeLauncher {
        log: Log,
        plans: Rc<RefCell<Vec<LaunchPlan>>>,
        fail: bool,
    }

    impl Launcher for FakeLauncher {
        fn launch(&self, plan: LaunchPlan) -> Result<(), BridgeError> {
            self.log.borrow_mut().push("launch");
            let program = plan.executable.to_string_lossy().into_owned();
            self.plans.borrow_mut().push(plan);
            if self.fail {
                return Err(BridgeError::Spawn {
                    program,
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            }
            Ok(())
        }
    }

    struct Harness {
        log: Log,
        output: Rc<RefCell<Vec<u8>>>,
        plans: Rc<RefCell<Vec<LaunchPlan>>>,
        search_paths: Rc<RefCell<Vec<Option<OsString>>>>,
        dispatcher: Dispatcher<FakeProbe, FakeLocator, FakeLauncher>,
    }

    struct Setup {
        os: HostOs,
        liveness: Liveness,
        installed: Vec<&'static str>,
        fail_launch: bool,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                os: HostOs::Other,
                liveness: Liveness::Live,
                installed: vec!["mpv", "streamlink"],
                fail_launch: false,
            }
        }
    }

    impl Setup {
        fn build(self) -> Harness {
            let log = Log::default();
            let plans = Rc::new(RefCell::new(Vec::new()));
            let search_paths = Rc::new(RefCell::new(Vec::new()));
            let host = HostEnvironment {
                os: self.os,
                path: Some(env::join_paths(["/usr/bin"]).unwrap()),
            };
            let dispatcher = Dispatcher::new(
                BridgeConfig::default(),
                host,
                FakeProbe {
                    liveness: self.liveness,
                    log: log.clone(),
                },
                FakeLocator {
                    installed: self.installed,
                    log: log.clone(),
                    search_paths: search_paths.clone(),
                },
                FakeLauncher {
                    log: log.clone(),
                    plans: plans.clone(),
                    fail: self.fail_launch,
                },
            );
            Harness {
                log,
                output: Rc::default(),
                plans,
                search_paths,
                dispatcher,
            }
        }
    }

    impl Harness {
        fn run(&self, input: &[u8]) -> Result<Strategy, BridgeError> {
            let writer = RecordingWriter {
                log: self.log.clone(),
                bytes: self.output.clone(),
            };
            let mut channel = Channel::new(Cursor::new(input.to_vec()), writer);
            self.dispatcher.run(&mut channel)
        }

        fn launched(&self) -> LaunchPlan {
            let plans = self.plans.borrow();
            assert_eq!(plans.len(), 1, "expected exactly one launch");
            plans[0].clone()
        }

        fn events(&self) -> Vec<&'static str> {
            self.log.borrow().clone()
        }
    }

    fn frame(json: &str) -> Vec<u8> {
        let mut bytes = (json.len() as u32).to_ne_bytes().to_vec();
        bytes.extend_from_slice(json.as_bytes());
        bytes
    }

    fn args(plan: &LaunchPlan) -> Vec<&str> {
        plan.arguments.iter().map(|a| a.to_str().unwrap()).collect()
    }

    const LIVE_URL: &str = "https://www.youtube.com/watch?v=X";

    fn live_request() -> Vec<u8> {
        frame(&format!(r#"{{"url":"{LIVE_URL}","options":["--mute"]}}"#))
    }

    #[test]
    fn test_live_stream_when_all_conditions_hold() {
        let h = Setup::default().build();
        assert_eq!(h.run(&live_request()).unwrap(), Strategy::LiveStream);

        let plan = h.launched();
        assert_eq!(plan.executable, "streamlink");
        assert_eq!(
            args(&plan),
            [
                "--player",
                "/usr/bin/mpv",
                "--player-args",
                "--no-terminal {playerinput}",
                LIVE_URL,
                "best"
            ]
        );
    }

    #[test]
    fn test_not_live_falls_back_to_player() {
        let h = Setup {
            liveness: Liveness::NotLive,
            ..Setup::default()
        }
        .build();
        assert_eq!(h.run(&live_request()).unwrap(), Strategy::DirectPlayer);
        assert_eq!(args(&h.launched()), ["--no-terminal", "--mute", "--", LIVE_URL]);
    }

    #[test]
    fn test_missing_helper_falls_back_without_probing() {
        let h = Setup {
            installed: vec!["mpv"],
            ..Setup::default()
        }
        .build();
        assert_eq!(h.run(&live_request()).unwrap(), Strategy::DirectPlayer);
        assert!(!h.events().contains(&"probe"));
    }

    #[test]
    fn test_unknown_host_falls_back_without_lookup_or_probe() {
        let h = Setup::default().build();
        let input = frame(r#"{"url":"https://vimeo.com/123","options":[]}"#);
        assert_eq!(h.run(&input).unwrap(), Strategy::DirectPlayer);
        assert_eq!(h.events(), ["ack", "launch"]);
        assert_eq!(h.launched().executable, "mpv");
    }

    #[test]
    fn test_example_probe_false_helper_absent() {
        let h = Setup {
            liveness: Liveness::NotLive,
            installed: vec![],
            ..Setup::default()
        }
        .build();
        let input = frame(r#"{"url":"https://youtube.com/watch?v=X","options":[]}"#);
        h.run(&input).unwrap();

        let plan = h.launched();
        assert_eq!(plan.executable, "mpv");
        assert_eq!(args(&plan), ["--no-terminal", "--", "https://youtube.com/watch?v=X"]);
    }

    #[test]
    fn test_empty_object_launches_player_without_target() {
        let h = Setup::default().build();
        assert_eq!(h.run(&frame("{}")).unwrap(), Strategy::DirectPlayer);
        assert_eq!(args(&h.launched()), ["--no-terminal", "--"]);
        assert!(!h.events().contains(&"probe"));
    }

    #[test]
    fn test_empty_input_still_acknowledges_and_launches() {
        let h = Setup::default().build();
        assert_eq!(h.run(&[]).unwrap(), Strategy::DirectPlayer);
        assert_eq!(h.events(), ["ack", "launch"]);
    }

    #[test]
    fn test_options_kept_in_order() {
        let h = Setup::default().build();
        let input = frame(
            r#"{"url":"https://example.com/a.webm","options":["--loop","--volume=50","--fs"]}"#,
        );
        h.run(&input).unwrap();
        assert_eq!(
            args(&h.launched()),
            ["--no-terminal", "--loop", "--volume=50", "--fs", "--", "https://example.com/a.webm"]
        );
    }

    #[test]
    fn test_ack_precedes_every_side_effect() {
        let setups = [
            Setup::default(),
            Setup {
                liveness: Liveness::NotLive,
                ..Setup::default()
            },
            Setup {
                installed: vec![],
                ..Setup::default()
            },
        ];
        for setup in setups {
            let h = setup.build();
            h.run(&live_request()).unwrap();
            let events = h.events();
            assert_eq!(events.first(), Some(&"ack"), "{events:?}");
            assert_eq!(events.last(), Some(&"launch"), "{events:?}");
            assert_eq!(events.iter().filter(|e| **e == "ack").count(), 1);
        }
    }

    #[test]
    fn test_ack_is_ok_frame() {
        let h = Setup::default().build();
        h.run(&live_request()).unwrap();

        let mut expected = 4u32.to_ne_bytes().to_vec();
        expected.extend_from_slice(b"\"ok\"");
        assert_eq!(*h.output.borrow(), expected);
    }

    #[test]
    fn test_spawn_failure_surfaces_after_ack() {
        let h = Setup {
            fail_launch: true,
            ..Setup::default()
        }
        .build();
        let err = h.run(&live_request()).unwrap_err();
        assert!(matches!(err, BridgeError::Spawn { .. }));
        assert_eq!(h.events().first(), Some(&"ack"));
    }

    #[test]
    fn test_truncated_frame_aborts_before_ack() {
        let h = Setup::default().build();
        let mut input = 100u32.to_ne_bytes().to_vec();
        input.extend_from_slice(b"{\"url\"");

        let err = h.run(&input).unwrap_err();
        assert!(matches!(err, BridgeError::Protocol(_)));
        assert!(h.events().is_empty());
        assert!(h.output.borrow().is_empty());
    }

    #[test]
    fn test_windows_plan_detaches_from_job() {
        let h = Setup {
            os: HostOs::Windows,
            ..Setup::default()
        }
        .build();
        h.run(&frame(r#"{"url":"https://example.com/v"}"#)).unwrap();

        let plan = h.launched();
        assert!(plan.spawn.detach_from_job);
        assert_eq!(plan.spawn.search_path, None);
    }

    #[test]
    fn test_macos_search_path_used_for_lookup_and_spawn() {
        let h = Setup {
            os: HostOs::MacOs,
            ..Setup::default()
        }
        .build();
        h.run(&live_request()).unwrap();

        let expected = env::join_paths(["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"]).unwrap();
        let plan = h.launched();
        assert_eq!(plan.spawn.search_path.as_ref(), Some(&expected));
        assert!(!plan.spawn.detach_from_job);
        assert!(h
            .search_paths
            .borrow()
            .iter()
            .all(|p| p.as_ref() == Some(&expected)));
    }

    #[test]
    fn test_unresolved_player_passed_by_name_to_helper() {
        let h = Setup {
            installed: vec!["streamlink"],
            ..Setup::default()
        }
        .build();
        h.run(&live_request()).unwrap();
        assert_eq!(args(&h.launched())[1], "mpv");
    }
}
