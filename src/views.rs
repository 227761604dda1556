//! Pages served by the device.

use std::path::Path;

use mote::config::Config;
use mote::diagnostic;
use mote::http::request::Request;
use mote::http::response::{Response, StatusCode};
use mote::server::Server;

pub fn register(server: &mut Server, cfg: &Config) {
    let index = cfg.index_page.clone();
    server.register("GET", "/", move |_req| index_page(&index));

    let index = cfg.index_page.clone();
    server.register("POST", "/", move |req| button_pressed(req, &index));

    let error_log = cfg.error_log.clone();
    server.register("GET", "/error/", move |_req| last_error(&error_log));
}

fn index_page(path: &Path) -> anyhow::Result<Response> {
    Ok(Response::file(path)?)
}

fn button_pressed(req: &Request, index: &Path) -> anyhow::Result<Response> {
    tracing::info!(peer = %req.peer, "Button pushed");
    index_page(index)
}

fn last_error(path: &Path) -> anyhow::Result<Response> {
    let report = diagnostic::read(path)?;
    Ok(Response::text(StatusCode::Ok, report))
}
