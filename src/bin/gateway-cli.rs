use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the prefix gateway admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List mounted prefixes with upstream health
    Mounts,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let endpoint = match cli.command {
        Commands::Status => "status",
        Commands::Mounts => "mounts",
    };

    let res = client
        .get(format!("{}/admin/{}", cli.url.trim_end_matches('/'), endpoint))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(admin_error(status, &text).into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Error reported (and turned into a non-zero exit) for a failed admin call.
fn admin_error(status: StatusCode, body: &str) -> String {
    if body.is_empty() {
        format!("admin API returned status {}", status)
    } else {
        format!("admin API returned status {}: {}", status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_error_names_status_and_body() {
        assert_eq!(
            admin_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
            "admin API returned status 401 Unauthorized: Unauthorized"
        );
        assert_eq!(
            admin_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            "admin API returned status 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn test_non_success_response_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 12\r\nConnection: close\r\n\r\nUnauthorized")
                .await;
        });

        let res = reqwest::Client::new()
            .get(format!("http://{}/admin/status", addr))
            .send()
            .await
            .unwrap();
        assert!(print_response(res).await.is_err());
    }
}
