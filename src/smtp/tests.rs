use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::{SmtpProbe, SmtpProbeError, SmtpProbeOptions, TcpSmtpProbe};
use crate::mx::MxResolver;

struct FixedMx(Vec<String>);

impl MxResolver for FixedMx {
    fn resolve_mx(&self, _domain: &str) -> Vec<String> {
        self.0.clone()
    }
}

fn loopback() -> FixedMx {
    FixedMx(vec!["127.0.0.1".to_string()])
}

fn spawn_mock_server(script: Vec<(&'static str, &'static str)>) -> (u16, thread::JoinHandle<()>) {
    spawn_mock_server_with_greeting(b"220 mock.smtp.test ESMTP\r\n", script)
}

fn spawn_mock_server_with_greeting(
    greeting: &'static [u8],
    script: Vec<(&'static str, &'static str)>,
) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let port = listener.local_addr().expect("addr").port();
    let (ready_tx, ready_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        ready_tx.send(()).ok();
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = handle_session(&mut stream, greeting, script);
        }
    });
    ready_rx.recv().expect("server ready");
    (port, handle)
}

fn handle_session(
    stream: &mut TcpStream,
    greeting: &[u8],
    script: Vec<(&'static str, &'static str)>,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    stream.write_all(greeting)?;
    stream.flush()?;
    for (expected, response) in script {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        assert!(
            line.starts_with(expected),
            "expected command starting with '{expected}', got '{line}'"
        );
        stream.write_all(response.as_bytes())?;
        stream.flush()?;
    }
    Ok(())
}

fn options(port: u16) -> SmtpProbeOptions {
    SmtpProbeOptions {
        port,
        connect_timeout: Duration::from_secs(2),
        command_timeout: Duration::from_secs(2),
        ..SmtpProbeOptions::default()
    }
}

fn dialogue(rcpt_response: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("HELO acme.test", "250 mock.smtp.test\r\n"),
        ("MAIL FROM:<me@sender.test>", "250 2.1.0 Ok\r\n"),
        ("RCPT TO:<jane@acme.test>", rcpt_response),
        ("QUIT", "221 2.0.0 Bye\r\n"),
    ]
}

#[test]
fn defaults_match_classic_probe() {
    let options = SmtpProbeOptions::default();
    assert_eq!(options.port, 25);
    assert_eq!(options.connect_timeout, Duration::from_secs(10));
    assert_eq!(options.helo_name("acme.test"), "acme.test");
}

#[test]
fn rcpt_250_is_accepted() {
    let (port, handle) = spawn_mock_server(dialogue("250 2.1.5 Ok\r\n"));
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    assert!(probe.probe("me@sender.test", "jane@acme.test", "acme.test"));
    handle.join().expect("server thread");
}

#[test]
fn rcpt_251_is_accepted() {
    let (port, handle) = spawn_mock_server(dialogue("251 User not local; will forward\r\n"));
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    assert!(probe.probe("me@sender.test", "jane@acme.test", "acme.test"));
    handle.join().expect("server thread");
}

#[test]
fn rcpt_550_is_rejected() {
    let (port, handle) = spawn_mock_server(dialogue("550 5.1.1 User unknown\r\n"));
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    let reply = probe
        .rcpt_reply("me@sender.test", "jane@acme.test", "acme.test")
        .expect("dialogue completes");
    assert_eq!(reply.code, 550);
    assert!(!reply.accepts_recipient());
    handle.join().expect("server thread");
}

#[test]
fn other_positive_codes_are_not_acceptance() {
    let (port, handle) = spawn_mock_server(dialogue("252 2.1.5 Cannot VRFY user\r\n"));
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    assert!(!probe.probe("me@sender.test", "jane@acme.test", "acme.test"));
    handle.join().expect("server thread");
}

#[test]
fn latin1_greeting_does_not_hide_acceptance() {
    let (port, handle) = spawn_mock_server_with_greeting(
        b"220-mx.acme.test Servidor de correio\r\n220 n\xe3o use para spam\r\n",
        dialogue("250 2.1.5 Ok\r\n"),
    );
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    let reply = probe
        .rcpt_reply("me@sender.test", "jane@acme.test", "acme.test")
        .expect("dialogue completes");
    assert_eq!(reply.code, 250);
    assert!(reply.accepts_recipient());
    handle.join().expect("server thread");
}

#[test]
fn greylisting_is_not_acceptance() {
    let (port, handle) = spawn_mock_server(dialogue("451 4.7.1 Greylisted, try later\r\n"));
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    assert!(!probe.probe("me@sender.test", "jane@acme.test", "acme.test"));
    handle.join().expect("server thread");
}

#[test]
fn helo_override_is_announced() {
    let (port, handle) = spawn_mock_server(vec![
        ("HELO probe.sender.test", "250 hi\r\n"),
        ("MAIL FROM:", "250 Ok\r\n"),
        ("RCPT TO:", "250 Ok\r\n"),
        ("QUIT", "221 Bye\r\n"),
    ]);
    let probe = TcpSmtpProbe::new(
        loopback(),
        SmtpProbeOptions {
            helo_domain: Some("probe.sender.test".to_string()),
            ..options(port)
        },
    );
    assert!(probe.probe("me@sender.test", "jane@acme.test", "acme.test"));
    handle.join().expect("server thread");
}

#[test]
fn server_hanging_up_mid_dialogue_is_rejection() {
    let (port, handle) = spawn_mock_server(vec![("HELO", "250 hi\r\n")]);
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    let err = probe
        .rcpt_reply("me@sender.test", "jane@acme.test", "acme.test")
        .expect_err("connection closes before RCPT");
    assert!(matches!(err, SmtpProbeError::Io { .. }), "{err:?}");
    handle.join().expect("server thread");
}

#[test]
fn refused_connection_is_rejection() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let probe = TcpSmtpProbe::new(loopback(), options(port));
    let err = probe
        .rcpt_reply("me@sender.test", "jane@acme.test", "acme.test")
        .expect_err("nothing listens");
    assert!(matches!(err, SmtpProbeError::Connect { .. }), "{err:?}");
    assert!(!probe.probe("me@sender.test", "jane@acme.test", "acme.test"));
}

#[test]
fn missing_mx_is_rejection_without_connecting() {
    let probe = TcpSmtpProbe::new(FixedMx(Vec::new()), SmtpProbeOptions::default());
    let err = probe
        .rcpt_reply("me@sender.test", "jane@acme.test", "acme.test")
        .expect_err("no mx");
    assert!(matches!(err, SmtpProbeError::NoMailServer { .. }));
}
