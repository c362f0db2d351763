//! Writes a greeting to an echo server every few seconds and prints replies.
//!
//! Usage: `echo_client [host:port]`, address defaults to `127.0.0.1:8000`.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use h2conn::CancellationToken;
use h2conn::ClientConf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log_ndc_env_logger::init();

    let addr: SocketAddr = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8000".to_owned())
        .parse()?;

    let lifetime = CancellationToken::new();
    let (conn, resp) = h2conn::connect(&lifetime, addr, ClientConf::new()).await?;
    println!("connected to {}, status {}", conn.remote_addr(), resp.status);

    let mut buf = vec![0u8; 4096];
    loop {
        conn.write(b"Helloworld").await?;
        let n = conn.read(&mut buf).await?;
        if n == 0 {
            println!("server closed connection");
            break;
        }
        println!("recv {}", String::from_utf8_lossy(&buf[..n]));
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    conn.close().await?;
    Ok(())
}
