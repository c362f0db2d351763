//! Duplex connections over Unix domain sockets.

#![cfg(unix)]

use tokio::runtime::Runtime;

use h2conn::CancellationToken;
use h2conn::Client;
use h2conn::ServerBuilder;
use h2conn_test::*;

#[test]
fn ping_pong_unix_domain_socket() {
    init_logger();

    let tempdir = tempdir::TempDir::new("h2conn_test").unwrap();
    let socket_path = tempdir.path().join("test_socket");
    let test_addr = socket_path.to_str().unwrap().to_owned();

    Runtime::new().unwrap().block_on(async {
        let (handler, mut accepted) = accepted_channel();
        let mut server = ServerBuilder::new();
        t!(server.set_unix_addr(&test_addr));
        server.set_handler(handler);
        let server = t!(server.build().await);

        let client = t!(Client::new_plain_unix(&test_addr, Default::default()).await);
        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let (_req, server_conn) = accepted.next().await;

        t!(conn.write(b"ping").await);
        assert_eq!(b"ping".to_vec(), t!(read_exact(&server_conn, 4).await));
        t!(server_conn.write(b"pong").await);
        assert_eq!(b"pong".to_vec(), t!(read_exact(&conn, 4).await));

        assert_eq!(test_addr, server.local_addr().to_string());
        assert!(server.local_addr().port().is_err());

        drop(server);
    });

    assert!(!socket_path.exists());
}
