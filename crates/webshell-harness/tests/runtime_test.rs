//! Runtime loop tests on a virtual clock.
//!
//! These drive the real [`Runtime`] with [`SimDriver`] and [`SimEnv`]: the
//! test script and the runtime share one task through `tokio::join!`, and
//! `ShellHandle::flush` is the barrier that makes every assertion
//! deterministic.

use std::time::Duration;

use webshell_app::{Runtime, ShellAction, ShellClosed, ShellEvent};
use webshell_core::{
    ConnectivitySignal, FileRequestId, HostPlatform, Notice, SequencerStage, ShellConfig,
    SubscriptionState,
};
use webshell_harness::{ShellWorld, SimDriver, SimEnv};
use webshell_proto::BridgeReply;

const FALLBACK: &str = "file:///android_asset/www/index.html";

fn config() -> ShellConfig {
    ShellWorld::sample_config(HostPlatform::Android)
}

#[tokio::test]
async fn offline_boot_loads_fallback() {
    let env = SimEnv::new();
    let driver = SimDriver::new();
    driver.set_reachable(false);
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, env, config());

    let script = async move {
        handle.flush().await.unwrap();
        assert_eq!(surface.take_performed(), vec![
            ShellAction::SubscribeConnectivity,
            ShellAction::LoadUrl(FALLBACK.into()),
            ShellAction::ShowNotice(Notice::NoInternet),
        ]);
        handle.shutdown().unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
    assert!(runtime.driver().is_stopped());
    assert_eq!(runtime.shell().connectivity().subscription(), SubscriptionState::Released);
}

#[tokio::test]
async fn invoke_answers_in_order() {
    let (mut runtime, handle) = Runtime::new(SimDriver::new(), SimEnv::new(), config());

    let script = async move {
        let name = handle.invoke(r#"{"name":"getPackageName"}"#).await.unwrap();
        assert_eq!(name, BridgeReply::text("com.example.sample"));

        let battery = handle.invoke(r#"{"name":"getBatteryLevel"}"#).await.unwrap();
        assert_eq!(battery, BridgeReply::integer(87));

        let unknown = handle.invoke(r#"{"name":"jailbreak"}"#).await.unwrap();
        assert!(unknown.is_error());
        handle.shutdown().unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
}

#[tokio::test]
async fn permission_batch_waits_for_grace_delay() {
    let env = SimEnv::new();
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, env.clone(), config());

    let requested = |surface: &SimDriver| {
        surface.performed().iter().any(|a| matches!(a, ShellAction::RequestPermissions(_)))
    };

    let script = async move {
        handle.flush().await.unwrap();
        env.advance(Duration::from_millis(4_900));
        handle.flush().await.unwrap();
        assert!(!requested(&surface));

        env.advance(Duration::from_millis(100));
        handle.flush().await.unwrap();
        assert!(requested(&surface));
        handle.shutdown().unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
}

#[tokio::test]
async fn shutdown_before_grace_delay_cancels_permissions() {
    let env = SimEnv::new();
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, env.clone(), config());

    let script = async move {
        env.advance(Duration::from_secs(1));
        handle.flush().await.unwrap();
        handle.shutdown().unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
    assert!(!surface.performed().iter().any(|a| matches!(a, ShellAction::RequestPermissions(_))));
    assert_eq!(runtime.shell().permissions().stage(), SequencerStage::Cancelled);
}

#[tokio::test]
async fn bridge_close_exits_and_tears_down_once() {
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, SimEnv::new(), config());

    let script = async move {
        let vibrate = handle.invoke(r#"{"name":"vibrate","arg":250}"#).await.unwrap();
        assert_eq!(vibrate, BridgeReply::Unit);

        let close = handle.invoke(r#"{"name":"close"}"#).await.unwrap();
        assert_eq!(close, BridgeReply::Unit);

        // The runtime stopped right after answering.
        assert_eq!(handle.flush().await, Err(ShellClosed));
        assert!(handle.post(ShellEvent::Tick).is_err());
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
    assert_eq!(surface.count(&ShellAction::Exit), 1);
    assert_eq!(surface.count(&ShellAction::UnsubscribeConnectivity), 1);
    assert!(surface.is_stopped());
}

#[tokio::test]
async fn double_back_at_root_exits() {
    let env = SimEnv::new();
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, env.clone(), config());

    let script = async move {
        handle.post(ShellEvent::BackPressed { can_go_back: false }).unwrap();
        handle.flush().await.unwrap();
        env.advance(Duration::from_secs(1));
        handle.post(ShellEvent::BackPressed { can_go_back: false }).unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
    assert_eq!(surface.notices(), vec![Notice::PressBackAgain]);
    assert_eq!(surface.count(&ShellAction::Exit), 1);
}

#[tokio::test]
async fn connectivity_loss_through_handle_redirects_to_fallback() {
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, SimEnv::new(), config());

    let script = async move {
        let url = "https://app.example.com/".to_string();
        handle.post(ShellEvent::PageStarted { url: url.clone() }).unwrap();
        handle.post(ShellEvent::PageFinished { url }).unwrap();
        handle.post(ShellEvent::Connectivity(ConnectivitySignal::Available(1))).unwrap();
        handle.post(ShellEvent::Connectivity(ConnectivitySignal::Available(2))).unwrap();
        handle.post(ShellEvent::Connectivity(ConnectivitySignal::Lost(1))).unwrap();
        handle.flush().await.unwrap();
        assert_eq!(surface.loads(), vec!["https://app.example.com/".to_string()]);

        handle.post(ShellEvent::Connectivity(ConnectivitySignal::Lost(2))).unwrap();
        handle.flush().await.unwrap();
        assert_eq!(surface.loads().last().map(String::as_str), Some(FALLBACK));
        assert_eq!(surface.notices(), vec![Notice::ConnectionLost]);
        handle.shutdown().unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
}

#[tokio::test]
async fn interception_uses_live_probe() {
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, SimEnv::new(), config());

    let script = async move {
        assert!(!handle.should_intercept("https://elsewhere.example.org/").await.unwrap());

        surface.set_reachable(false);
        assert!(handle.should_intercept("https://elsewhere.example.org/").await.unwrap());
        assert!(!handle.should_intercept(FALLBACK).await.unwrap());
        assert_eq!(surface.notices(), vec![Notice::NoConnection]);
        handle.shutdown().unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
}

#[tokio::test]
async fn dropping_every_handle_tears_down() {
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, SimEnv::new(), config());

    let script = async move {
        handle.post(ShellEvent::FileChooserRequested { request: FileRequestId(7) }).unwrap();
        handle.flush().await.unwrap();
        drop(handle);
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
    assert_eq!(
        surface.count(&ShellAction::ResolveFileRequest { request: FileRequestId(7), files: None }),
        1
    );
    assert_eq!(surface.count(&ShellAction::UnsubscribeConnectivity), 1);
    assert!(surface.is_stopped());
}

#[tokio::test]
async fn blocking_invoke_from_host_thread() {
    let (mut runtime, handle) = Runtime::new(SimDriver::new(), SimEnv::new(), config());
    let host = handle.clone();

    let script = async move {
        let reply = tokio::task::spawn_blocking(move || host.invoke_blocking(r#"{"name":"isCharging"}"#))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply, BridgeReply::boolean(false));
        handle.shutdown().unwrap();
    };

    let (result, ()) = tokio::join!(runtime.run(), script);
    result.unwrap();
}

#[tokio::test]
async fn driver_failure_stops_the_loop() {
    let driver = SimDriver::new();
    let surface = driver.clone();
    let (mut runtime, handle) = Runtime::new(driver, SimEnv::new(), config());

    let script = async move {
        handle.flush().await.unwrap();
        handle.post(ShellEvent::FileChooserRequested { request: FileRequestId(7) }).unwrap();
        handle.flush().await.unwrap();
        surface.detach();
        handle.post(ShellEvent::PageStarted { url: "https://app.example.com/".into() }).unwrap();
        handle
    };

    let (result, handle) = tokio::join!(runtime.run(), script);
    assert!(result.is_err());

    // Teardown still ran: the subscription is released, the pending chooser
    // callback resolved, and callers see a closed shell.
    let shell = runtime.shell();
    assert!(shell.is_finishing());
    assert_eq!(shell.connectivity().subscription(), SubscriptionState::Released);
    assert_eq!(shell.files().pending(), None);
    assert!(runtime.driver().is_stopped());
    assert_eq!(handle.invoke(r#"{"name":"getBatteryLevel"}"#).await, Err(ShellClosed));
}
