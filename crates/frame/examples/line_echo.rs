use micro_frame::server::{LineService, Server};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = match Server::builder().address("127.0.0.1:1234").build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "build server error");
            return;
        }
    };

    if let Err(e) = server.start(LineService).await {
        error!(cause = %e, "server stopped");
    }
}
