//! Cookie session access for handlers.
//!
//! Handlers only ever store or read the authenticated user id, so the
//! wrapper exposes exactly that.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Session wrapper extracted by handlers.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Current user id, if the session carries a valid one.
    ///
    /// A malformed id is treated as anonymous.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::new(&raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    const ADMIN: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let body = match session.user_id()? {
            Some(id) => id.to_string(),
            None => "anonymous".to_owned(),
        };
        Ok(HttpResponse::Ok().body(body))
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        let id = UserId::new(ADMIN).expect("fixture id");
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, ADMIN);
    }

    #[actix_web::test]
    async fn no_cookie_is_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "anonymous");
    }

    #[actix_web::test]
    async fn tampered_user_id_reads_as_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(USER_ID_KEY, "not-a-uuid")
                            .expect("set invalid user id");
                        HttpResponse::Ok()
                    }),
                )
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(test::read_body(res).await, "anonymous");
    }
}
