use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use serde::Serialize;

pub async fn post_form<F: Serialize>(
    path: &str,
    form: &F,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).set_form(form).to_request();
    let service = test::init_service(App::new().configure(configure)).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

/// Posts the fields as a `multipart/form-data` body.
pub async fn post_multipart(
    path: &str,
    fields: &[(&str, String)],
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let boundary = "cd3b382df1d34ab8b138b471662479f6";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    let req = TestRequest::post()
        .uri(path)
        .insert_header(("Content-Type", format!("multipart/form-data; boundary={boundary}")))
        .set_payload(body)
        .to_request();
    let service = test::init_service(App::new().configure(configure)).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

/// Posts a raw JSON body so that the bytes on the wire are exactly the bytes that were signed.
pub async fn post_raw_json(
    path: &str,
    body: &str,
    headers: &[(&str, &str)],
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json"));
    for (name, value) in headers {
        req = req.insert_header((name.to_string(), value.to_string()));
    }
    let req = req.set_payload(body.to_string()).to_request();
    let service = test::init_service(App::new().configure(configure)).await;
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}
