use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    depweight::app::startup::run().await
}
