//! CLI tests against config and script files on disk.

use std::{fs, time::Duration};

use proptest::prelude::*;
use tempfile::TempDir;
use webshell_cli::{
    CliError, commands, replay,
    script::{self, Command},
};
use webshell_core::{NavigationState, ShellConfig};

const CONFIG: &str = r#"
app_name = "Field Notes"
package_id = "org.example.notes"
remote_url = "https://notes.example.org/"
splash_path = "splash.png"
platform = "android"
tier = 30
permissions = ["camera", "fine-location", "background-location", "post-notifications"]

[timings]
grace_delay_ms = 1000
exit_window_ms = 2000
splash_fade_ms = 250
tick_ms = 100
"#;

fn write_config(dir: &TempDir, text: &str) -> ShellConfig {
    let path = dir.path().join("shell.toml");
    fs::write(&path, text).unwrap();
    ShellConfig::load(&path).unwrap()
}

fn transcript(
    config: ShellConfig,
    commands: &[Command],
    online: bool,
) -> (webshell_cli::SessionSummary, String) {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
    let mut out = Vec::new();
    let summary = runtime.block_on(replay(config, commands, online, &mut out)).unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[test]
fn check_reads_config_from_disk() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);

    let mut out = Vec::new();
    commands::check(&config, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Field Notes (org.example.notes)"));
    assert!(text.contains("android tier 30"));
    assert!(text.contains("splash fade 250ms"));
}

#[test]
fn plan_uses_configured_tier_and_permissions() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);

    let mut out = Vec::new();
    commands::plan(&config, None, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("android tier 30\nbatch after 1000ms:\n"));
    assert!(text.contains("   1. Camera (android.permission.CAMERA)\n"));
    assert!(text.contains("   2. FineLocation (android.permission.ACCESS_FINE_LOCATION)\n"));
    assert!(text.contains("follow-up: BackgroundLocation"));
    assert!(text.contains("not requested: PostNotifications\n"));
}

#[test]
fn missing_config_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let err = ShellConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.is_io());
    assert!(CliError::from(err).is_usage());
}

#[test]
fn script_file_replays_a_full_session() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, CONFIG);
    let path = dir.path().join("session.txt");
    fs::write(
        &path,
        "\
# content loads, the grace delay passes, the user grants everything
started https://notes.example.org/
finished https://notes.example.org/
wait 1000
grant-all
grant-all
invoke {\"name\":\"notification\",\"arg\":{\"title\":\"Saved\",\"message\":\"Note stored\"}}

# the network drops while the user wanders off
offline
navigate https://elsewhere.example.org/
started file:///android_asset/www/index.html
finished file:///android_asset/www/index.html
online
back-root
back-root
wait 100
",
    )
    .unwrap();

    let commands = script::parse(&fs::read_to_string(&path).unwrap()).unwrap();
    let (summary, text) = transcript(config, &commands, true);

    assert!(text.contains("  fade splash over 250ms\n"));
    assert!(text.contains("  request follow-up permission BackgroundLocation\n"));
    assert!(text.contains(
        "> navigate https://elsewhere.example.org/\n  navigation blocked\n  notice \"No Connection\"\n"
    ));
    assert!(text.contains("  load https://notes.example.org/\n"));
    assert!(text.contains("  notice \"Back Online\"\n"));
    assert!(summary.exited);
    assert_eq!(summary.commands, 13);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.elapsed, Duration::from_millis(1_000));
}

#[test]
fn script_errors_name_the_line() {
    let err = script::parse("online\nwait\n").unwrap_err();
    assert_eq!(err.line(), 2);
    assert_eq!(CliError::from(err).to_string(), "line 2: `wait` needs a duration in milliseconds");
}

fn command_strategy() -> impl Strategy<Value = Command> {
    let url = prop_oneof![
        Just("https://notes.example.org/".to_string()),
        Just("https://notes.example.org/list".to_string()),
        Just("file:///android_asset/www/index.html".to_string()),
        Just("https://elsewhere.example.org/".to_string()),
    ];
    prop_oneof![
        (1u64..3).prop_map(Command::Online),
        (1u64..3).prop_map(Command::Offline),
        url.clone().prop_map(Command::Started),
        url.clone().prop_map(Command::Finished),
        url.clone().prop_map(Command::Failed),
        url.prop_map(Command::Navigate),
        Just(Command::Back),
        Just(Command::BackRoot),
        Just(Command::Invoke(r#"{"name":"getBatteryLevel"}"#.into())),
        Just(Command::Invoke(r#"{"name":"vibrate","arg":50}"#.into())),
        (0u64..3_000).prop_map(|ms| Command::Wait(Duration::from_millis(ms))),
        Just(Command::File),
        Just(Command::FileCancel),
        Just(Command::GrantAll),
        Just(Command::DenyAll),
        Just(Command::SplashFaded),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every delivered command is echoed once and nothing is left pending
    /// after the session ends.
    #[test]
    fn prop_transcript_accounts_for_every_command(
        online in any::<bool>(),
        commands in prop::collection::vec(command_strategy(), 0..40),
    ) {
        let dir = TempDir::new().unwrap();
        let config = write_config(&dir, CONFIG);
        let (summary, text) = transcript(config, &commands, online);

        prop_assert_eq!(summary.commands + summary.skipped, commands.len());
        prop_assert_eq!(text.lines().filter(|l| l.starts_with("> ")).count(), summary.commands);
        prop_assert_eq!(
            text.matches("launch file picker").count(),
            text.matches("resolve file request").count()
        );
        if !online && summary.commands == 0 {
            prop_assert_eq!(summary.final_state, NavigationState::LoadingFallback);
        }
    }
}
