//! Accepts duplex connections and echoes back whatever the client writes.
//!
//! Usage: `echo_server [port]`, port defaults to 8000.

use std::env;
use std::sync::Arc;

use h2conn::Conn;
use h2conn::ServerBuilder;
use h2conn::ServerRequest;

async fn serve(req: ServerRequest, conn: Conn) {
    let conn = Arc::new(conn);
    println!("{} joined ({} {})", conn.remote_addr(), req.method(), req.uri());

    let mut buf = vec![0u8; 4096];
    loop {
        let n = match conn.read(&mut buf).await {
            Ok(0) => {
                println!("{} left", conn.remote_addr());
                break;
            }
            Ok(n) => n,
            Err(e) => {
                println!("failed reading from {}: {}", conn.remote_addr(), e);
                break;
            }
        };
        println!("got: {}", String::from_utf8_lossy(&buf[..n]));
        if let Err(e) = conn.write(&buf[..n]).await {
            println!("failed writing to {}: {}", conn.remote_addr(), e);
            break;
        }
    }

    if let Err(e) = conn.close().await {
        println!("close failed: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log_ndc_env_logger::init();

    let port: u16 = match env::args().nth(1) {
        Some(port) => port.parse()?,
        None => 8000,
    };

    let mut server = ServerBuilder::new();
    server.set_addr(("0.0.0.0", port))?;
    server.set_handler(|req: ServerRequest, conn: Conn| -> h2conn::Result<()> {
        tokio::spawn(serve(req, conn));
        Ok(())
    });
    let server = server.build().await?;

    println!("serving on http://{}", server.local_addr());

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    Ok(())
}
