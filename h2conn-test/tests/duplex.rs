//! Data exchange over duplex connections.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::time::timeout;

use h2conn::CancellationToken;
use h2conn::ClientConf;
use h2conn::CommonConf;
use h2conn::Conn;
use h2conn::ServerConf;
use h2conn::ServerRequest;
use h2conn_test::*;

#[test]
fn ping_reaches_acceptor() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let (server, mut accepted) = ServerTest::accepting().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (conn, resp) = t!(client.connect(&lifetime).await);
        assert_eq!(200, resp.status.as_u16());

        let (_req, server_conn) = accepted.next().await;

        assert_eq!(4, t!(conn.write(b"ping").await));
        let mut buf = vec![0u8; 4096];
        let n = t!(server_conn.read(&mut buf).await);
        assert_eq!(4, n);
        assert_eq!(b"ping", &buf[..4]);
    });
}

#[test]
fn pong_reaches_connector() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let (server, mut accepted) = ServerTest::accepting().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let (_req, server_conn) = accepted.next().await;

        t!(conn.write(b"ping").await);
        assert_eq!(b"ping".to_vec(), t!(read_exact(&server_conn, 4).await));

        t!(server_conn.write(b"pong").await);
        let mut buf = vec![0u8; 4096];
        let n = t!(conn.read(&mut buf).await);
        assert_eq!(4, n);
        assert_eq!(b"pong", &buf[..n]);
    });
}

#[test]
fn acceptor_can_write_first() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let (server, mut accepted) = ServerTest::accepting().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let (_req, server_conn) = accepted.next().await;

        t!(server_conn.write(b"hello").await);
        assert_eq!(b"hello".to_vec(), t!(read_exact(&conn, 5).await));
    });
}

#[test]
fn sequential_writes_arrive_in_order() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let (server, mut accepted) = ServerTest::accepting().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let (_req, server_conn) = accepted.next().await;

        let mut expected = Vec::new();
        for i in 0..200u32 {
            let chunk: Vec<u8> = (0..(i % 37 + 1)).map(|j| (i + j) as u8).collect();
            t!(conn.write(&chunk).await);
            expected.extend_from_slice(&chunk);
        }
        t!(conn.close().await);

        let received = t!(read_to_end(&server_conn).await);
        assert_eq!(expected, received);
    });
}

#[test]
fn large_transfer_through_echo() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let server = ServerTest::echo().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let conn = Arc::new(conn);

        // several times larger than the default HTTP/2 window
        let data: Vec<u8> = (0..1_000_000u32).map(|i| (i % 251) as u8).collect();

        let conn_copy = conn.clone();
        let data_copy = data.clone();
        let writer = tokio::spawn(async move {
            for chunk in data_copy.chunks(10_000) {
                conn_copy.write(chunk).await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let received = t!(timeout(Duration::from_secs(30), read_exact(&conn, data.len())).await);
        t!(t!(writer.await));
        assert_eq!(data, t!(received));
        t!(conn.close().await);
    });
}

fn small_window_conf() -> CommonConf {
    let mut common = CommonConf::default();
    common.initial_window_size = Some(1024);
    common.initial_connection_window_size = Some(1 << 20);
    common.max_frame_size = Some(16_384);
    common
}

#[test]
fn transfer_with_small_flow_control_window() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let mut server_conf = ServerConf::new();
        server_conf.common = small_window_conf();
        let server = ServerTest::new_with_conf(
            server_conf,
            |_req: ServerRequest, conn: Conn| -> h2conn::Result<()> {
                tokio::spawn(echo(conn));
                Ok(())
            },
        )
        .await;

        let mut client_conf = ClientConf::new();
        client_conf.common = small_window_conf();
        let client = server.client_with_conf(client_conf).await;

        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let conn = Arc::new(conn);

        // every write is larger than the stream window
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();

        let conn_copy = conn.clone();
        let data_copy = data.clone();
        let writer = tokio::spawn(async move {
            for chunk in data_copy.chunks(5_000) {
                conn_copy.write(chunk).await?;
            }
            Ok::<_, std::io::Error>(())
        });

        let received = t!(timeout(Duration::from_secs(30), read_exact(&conn, data.len())).await);
        t!(t!(writer.await));
        assert_eq!(data, t!(received));
        t!(conn.close().await);
    });
}

#[test]
fn concurrent_writes_are_not_interleaved() {
    init_logger();

    const BLOCK: usize = 64;
    const WRITES: usize = 1000;

    Runtime::new().unwrap().block_on(async {
        let (server, mut accepted) = ServerTest::accepting().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let conn = Arc::new(conn);
        let (_req, server_conn) = accepted.next().await;

        let mut writers = Vec::new();
        for &byte in &[b'A', b'B'] {
            let conn = conn.clone();
            writers.push(tokio::spawn(async move {
                let block = [byte; BLOCK];
                for _ in 0..WRITES {
                    assert_eq!(BLOCK, conn.write(&block).await?);
                }
                Ok::<_, std::io::Error>(())
            }));
        }

        let received = t!(
            timeout(
                Duration::from_secs(30),
                read_exact(&server_conn, 2 * BLOCK * WRITES)
            )
            .await
        );
        let received = t!(received);
        for w in writers {
            t!(t!(w.await));
        }

        let mut a = 0;
        let mut b = 0;
        for block in received.chunks(BLOCK) {
            assert!(
                block.iter().all(|&c| c == block[0]),
                "interleaved block: {:?}",
                String::from_utf8_lossy(block)
            );
            match block[0] {
                b'A' => a += 1,
                b'B' => b += 1,
                c => panic!("unexpected byte {}", c),
            }
        }
        assert_eq!(WRITES, a);
        assert_eq!(WRITES, b);
    });
}

#[test]
fn read_and_write_do_not_block_each_other() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let (server, mut accepted) = ServerTest::accepting().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (conn, _) = t!(client.connect(&lifetime).await);
        let conn = Arc::new(conn);
        let (_req, server_conn) = accepted.next().await;

        // connector reader is parked waiting for data which comes
        // only after the connector writes
        let conn_copy = conn.clone();
        let reader = tokio::spawn(async move { read_exact(&conn_copy, 3).await });
        tokio::time::sleep(Duration::from_millis(50)).await;

        t!(timeout(Duration::from_secs(5), conn.write(b"req")).await).unwrap();
        let got = t!(timeout(Duration::from_secs(5), read_exact(&server_conn, 3)).await);
        assert_eq!(b"req".to_vec(), t!(got));

        t!(server_conn.write(b"rep").await);
        let got = t!(timeout(Duration::from_secs(5), reader).await);
        assert_eq!(b"rep".to_vec(), t!(t!(got)));
    });
}

#[test]
fn connections_on_one_client_are_independent() {
    init_logger();

    Runtime::new().unwrap().block_on(async {
        let (server, mut accepted) = ServerTest::accepting().await;
        let client = server.client().await;

        let lifetime = CancellationToken::new();
        let (first, _) = t!(client.connect(&lifetime).await);
        let (_, first_server) = accepted.next().await;
        let (second, _) = t!(client.connect(&lifetime).await);
        let (_, second_server) = accepted.next().await;

        t!(second.write(b"two").await);
        t!(first.write(b"one").await);
        assert_eq!(b"one".to_vec(), t!(read_exact(&first_server, 3).await));
        assert_eq!(b"two".to_vec(), t!(read_exact(&second_server, 3).await));

        // closing one does not affect the other
        t!(first.close().await);
        let mut buf = [0u8; 16];
        assert_eq!(0, t!(first_server.read(&mut buf).await));

        t!(second.write(b"still").await);
        assert_eq!(b"still".to_vec(), t!(read_exact(&second_server, 5).await));
    });
}
