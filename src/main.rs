mod config;
mod error;
mod logic;
mod metadata;
mod protocol;
mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::BytesMut;
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::EnvFilter;

use config::Config;
use logic::AppState;
use protocol::{request, ResponseMessage};
use storage::PartitionLogs;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let metadata = metadata::loader::load(config.cluster_metadata_log_path())
        .context("load cluster metadata log")?;

    let state = AppState {
        config: Arc::new(config.clone()),
        metadata: Arc::new(metadata),
        logs: Arc::new(PartitionLogs::new()),
    };

    let listener = match TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(addr = %config.listen_addr, %err, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(addr = %config.listen_addr, "listening");

    loop {
        let (stream, peer_addr) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(
            async move {
                info!("accepted connection");
                if let Err(err) = handle_connection(stream, state).await {
                    warn!(%err, "connection closed with error");
                }
            }
            .instrument(info_span!("connection", peer = %peer_addr)),
        );
    }
}

async fn handle_connection(mut stream: TcpStream, state: AppState) -> Result<()> {
    loop {
        let mut msg_size_buf = [0u8; 4];
        match stream.read_exact(&mut msg_size_buf).await {
            Ok(_) => {}
            // A clean disconnect between requests is not an error; one
            // mid-frame is still surfaced below via `read_exact` on the body.
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err).context("read message size"),
        }

        let msg_size = i32::from_be_bytes(msg_size_buf) as usize;
        let mut msg = BytesMut::with_capacity(msg_size);
        msg.resize(msg_size, 0);
        stream
            .read_exact(&mut msg)
            .await
            .context("read message data")?;

        let msg = msg.freeze();
        let api_key = request::HeaderV2::decode(&mut msg.clone())
            .context("decode request header")?
            .request_api_key;

        let mut body = msg;
        let response = logic::process(&state, api_key, &mut body)
            .await
            .context("process request")?;

        let framed = ResponseMessage::from_bytes(response.as_bytes());
        stream
            .write_all(framed.as_bytes())
            .await
            .context("write response")?;
    }

    Ok(())
}
