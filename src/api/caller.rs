use crate::model::role::Role;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{Ready, ready};

/// Identity as asserted by the trusted gateway in front of this service.
/// No verification happens here; a missing or unknown header demotes the
/// caller to the employee role.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub role: Role,
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let role = req
            .headers()
            .get("X-Role")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Role>().ok())
            .unwrap_or(Role::Employee);

        ready(Ok(Caller { role }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    async fn extract(req: TestRequest) -> Caller {
        let (req, mut payload) = req.to_http_parts();
        Caller::from_request(&req, &mut payload).await.unwrap()
    }

    #[actix_web::test]
    async fn header_roles_are_recognized() {
        let caller = extract(TestRequest::default().insert_header(("X-Role", "admin"))).await;
        assert_eq!(caller.role, Role::Admin);

        let caller = extract(TestRequest::default().insert_header(("X-Role", "hr"))).await;
        assert_eq!(caller.role, Role::Hr);
    }

    #[actix_web::test]
    async fn missing_or_unknown_headers_demote_to_employee() {
        let caller = extract(TestRequest::default()).await;
        assert_eq!(caller.role, Role::Employee);

        let caller = extract(TestRequest::default().insert_header(("X-Role", "superuser"))).await;
        assert_eq!(caller.role, Role::Employee);
    }
}
