use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    rollcall::app::startup::startup().await
}
