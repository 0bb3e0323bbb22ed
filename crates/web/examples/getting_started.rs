use http::StatusCode;
use serde::Deserialize;
use strand_http::protocol::{Request, Response};
use strand_web::handler::{HandlerError, handler_fn};
use strand_web::media::{ContentMediaType, ResponseMediaTypeSelector};
use strand_web::param::{ParamType, Params};
use strand_web::query::QueryParams;
use strand_web::router::{Action, Router};
use strand_web::server::Server;
use tracing::Level;

#[derive(Deserialize, Debug)]
struct Paging {
    page: Option<u32>,
    size: Option<u32>,
}

// curl -v http://127.0.0.1:8080/health
async fn health(_request: Request, _params: Params) -> Result<Response, HandlerError> {
    Ok(Response::new(StatusCode::OK).with_body("ok\r\n"))
}

// curl -v -H 'Accept: application/json' http://127.0.0.1:8080/users/42
// curl -v -H 'Accept: text/html' http://127.0.0.1:8080/users/42   => 406
async fn user(request: Request, params: Params) -> Result<Response, HandlerError> {
    let id = params.get::<i64>("id").unwrap_or_default();
    let media_type = ResponseMediaTypeSelector::for_request(&request)
        .select(&[ContentMediaType::plain_text(), ContentMediaType::json()])?;

    let body = if media_type == ContentMediaType::json() { format!("{{\"id\":{id}}}\r\n") } else { format!("user {id}\r\n") };
    Ok(Response::new(StatusCode::OK).with_header("Content-Type", media_type.to_string()).with_body(body))
}

// curl -v 'http://127.0.0.1:8080/users/42/orders?page=2&size=10'
async fn orders(request: Request, params: Params) -> Result<Response, HandlerError> {
    let id = params.get::<i64>("id").unwrap_or_default();
    let paging: Paging = QueryParams::deserialize(&request)?;
    Ok(Response::new(StatusCode::OK).with_body(format!("orders of user {id}, {paging:?}\r\n")))
}

// curl -v http://127.0.0.1:8080/files/docs/readme.txt
async fn file(_request: Request, params: Params) -> Result<Response, HandlerError> {
    let path = params.get::<String>("path").unwrap_or_default();
    Ok(Response::new(StatusCode::OK).with_body(format!("file {path}\r\n")))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let router = Router::builder()
        .route(Action::get("/health").to(handler_fn(health)))
        .route(Action::get("/users/{id}").param(ParamType::Long).to(handler_fn(user)))
        .route(Action::get("/users/{id}/orders").param(ParamType::Long).to(handler_fn(orders)))
        .route(Action::get("/files/{path}").disallow_slash_in_path_parameter(false).to(handler_fn(file)))
        .build()?;

    Server::builder().router(router).bind("127.0.0.1:8080").log_level(Level::DEBUG).build()?.start().await?;
    Ok(())
}
