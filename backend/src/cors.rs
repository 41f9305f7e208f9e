use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use rocket::http::Header;

pub struct CORS {
    allowed_origins: Vec<String>,
}

impl CORS {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    fn allows(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == "*" || allowed == origin)
    }
}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(origin) = req.headers().get_one("Origin") else {
            return;
        };

        if self.allows(origin) {
            res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_owned()));
            res.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, OPTIONS"));
            res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
            res.set_header(Header::new("Vary", "Origin"));
        }
    }
}
