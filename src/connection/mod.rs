pub(crate) mod http;

pub use self::http::{Credentials, HttpResponse, RemoteClient};
