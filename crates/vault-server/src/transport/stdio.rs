//! stdio transport: one JSON request per line in, one JSON response per line out

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::protocol::RequestRouter;

/// stdio transport for the vault protocol
pub struct StdioTransport {
    router: RequestRouter,
}

impl StdioTransport {
    /// Create a new stdio transport
    pub fn new(router: RequestRouter) -> Self {
        Self { router }
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Starting vault server on stdio");

        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Serve requests from `reader`, writing responses to `writer`
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), Box<dyn std::error::Error>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();

            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let request = line.trim();
            if request.is_empty() {
                continue;
            }

            // Requests may carry passwords; log sizes only.
            debug!("Received request ({} bytes)", request.len());

            let response = self.router.handle_line(request).await;
            let response_line = serde_json::to_string(&response)?;

            writer.write_all(response_line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }
}
