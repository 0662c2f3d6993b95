use micro_frame::config::ConnectionConfig;
use micro_frame::handler::RouteTable;
use micro_frame::server::{HttpService, Server};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = ConnectionConfig::new().with_validate_headers(true);
    let server = match Server::builder().address("127.0.0.1:8080").config(config).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "build server error");
            return;
        }
    };

    let routes = RouteTable::builder().echo("/echo").fixed("/lolyou", "you have been hacked!").build();

    if let Err(e) = server.start(HttpService::new(routes)).await {
        error!(cause = %e, "server stopped");
    }
}
