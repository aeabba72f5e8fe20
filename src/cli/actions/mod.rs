pub mod admin;
pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
    },
    CreateAdmin {
        dsn: String,
        username: String,
        password: String,
    },
}
