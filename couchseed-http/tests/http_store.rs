//! `Database` against a canned-response HTTP server on localhost.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use couchseed_core::{DesignDocument, View};
use couchseed_http::{Client, HttpError};
use couchseed_sync::{seed, DesignStore};

/// A request as received: head (request line + headers) and body.
#[derive(Debug)]
struct Seen {
    request_line: String,
    body: String,
}

/// Answer one connection per canned `(status, body)`, in order.
fn serve(responses: Vec<(u16, String)>) -> (String, JoinHandle<Vec<Seen>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().expect("accept");
            seen.push(read_request(&stream));
            let reply = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(reply.as_bytes()).expect("write reply");
            stream.flush().expect("flush");
        }
        seen
    });
    (format!("http://{addr}"), handle)
}

fn read_request(stream: &TcpStream) -> Seen {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("request line");

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("header line");
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().expect("content-length");
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).expect("body");
    Seen {
        request_line: request_line.trim_end().to_string(),
        body: String::from_utf8(body).expect("utf8 body"),
    }
}

fn player(map: &str) -> DesignDocument {
    DesignDocument::new("player").with_view("byName", View::map(map))
}

#[test]
fn all_design_docs_queries_the_design_key_range() {
    let rows = r#"{"total_rows":3,"offset":0,"rows":[
        {"id":"_design/_auth","key":"_design/_auth","value":{"rev":"1-a"},
         "doc":{"_id":"_design/_auth","_rev":"1-a","language":"javascript","validate_doc_update":"function(){}"}},
        {"id":"_design/player","key":"_design/player","value":{"rev":"2-b"},
         "doc":{"_id":"_design/player","_rev":"2-b","views":{"byName":{"map":"function(doc){}"}}}}
    ]}"#;
    let (base, server) = serve(vec![(200, rows.to_string())]);
    let db = Client::new(&base).expect("client").database("game");

    let docs = db.all_design_docs().expect("all design docs");
    let seen = server.join().expect("server thread");

    assert_eq!(docs.len(), 2);
    assert!(docs[0].is_internal());
    assert_eq!(docs[1].rev(), "2-b");
    assert_eq!(docs[1].views["byName"].map, "function(doc){}");

    let line = &seen[0].request_line;
    assert!(line.starts_with("GET /game/_all_docs?"), "got: {line}");
    assert!(line.contains("startkey=%22_design%2F%22"), "got: {line}");
    assert!(line.contains("endkey=%22_design0%22"), "got: {line}");
    assert!(line.contains("include_docs=true"), "got: {line}");
}

#[test]
fn seed_issues_delete_get_put_in_order() {
    let listing = r#"{"rows":[
        {"id":"_design/player","doc":{"_id":"_design/player","_rev":"1-abc","views":{"byName":{"map":"old"}}}},
        {"id":"_design/user","doc":{"_id":"_design/user","_rev":"1-def","views":{"byToken":{"map":"function(doc){}"}}}}
    ]}"#;
    let (base, server) = serve(vec![
        (200, listing.to_string()),
        (200, r#"{"ok":true,"id":"_design/user","rev":"2-ghi"}"#.to_string()),
        (
            200,
            r#"{"_id":"_design/player","_rev":"2-xyz","views":{"byName":{"map":"old"}}}"#
                .to_string(),
        ),
        (201, r#"{"ok":true,"id":"_design/player","rev":"3-new"}"#.to_string()),
    ]);
    let db = Client::new(&base).expect("client").database("game");

    let report = seed(&db, &[player("function(doc){}")]).expect("seed");
    let seen = server.join().expect("server thread");

    assert_eq!(report.deleted, vec!["_design/user".to_string()]);
    assert_eq!(
        report.updated,
        vec![("_design/player".to_string(), "3-new".to_string())]
    );
    assert!(report.created.is_empty());

    assert!(seen[0].request_line.starts_with("GET /game/_all_docs?"));
    assert_eq!(
        seen[1].request_line,
        "DELETE /game/_design/user?rev=1-def HTTP/1.1"
    );
    assert_eq!(seen[2].request_line, "GET /game/_design/player HTTP/1.1");
    assert_eq!(seen[3].request_line, "PUT /game/_design/player HTTP/1.1");

    let body: serde_json::Value = serde_json::from_str(&seen[3].body).expect("put body");
    assert_eq!(body["_id"], "_design/player");
    assert_eq!(body["_rev"], "2-xyz", "put must carry the re-fetched rev");
    assert_eq!(body["views"]["byName"]["map"], "function(doc){}");
}

#[test]
fn create_sends_no_revision() {
    let (base, server) = serve(vec![(
        201,
        r#"{"ok":true,"id":"_design/player","rev":"1-aaa"}"#.to_string(),
    )]);
    let db = Client::new(&base).expect("client").database("game");

    let rev = db.put_design_doc(&player("function(doc){}")).expect("put");
    let seen = server.join().expect("server thread");

    assert_eq!(rev, "1-aaa");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).expect("put body");
    assert!(body.get("_rev").is_none());
    assert_eq!(body["language"], "javascript");
}

#[test]
fn conflict_is_reported_with_server_reason() {
    let (base, server) = serve(vec![(
        409,
        r#"{"error":"conflict","reason":"Document update conflict."}"#.to_string(),
    )]);
    let db = Client::new(&base).expect("client").database("game");

    let err = db
        .put_design_doc(&player("x").with_rev("1-stale"))
        .unwrap_err();
    server.join().expect("server thread");

    let couch = err.as_couch().expect("status error");
    assert!(couch.is_conflict());
    assert_eq!(couch.method, "PUT");
    assert_eq!(couch.error, "conflict");
    assert_eq!(couch.reason, "Document update conflict.");
    assert!(couch.url.ends_with("/game/_design/player"));
}

#[test]
fn fetch_failure_aborts_seed_without_writes() {
    let (base, server) = serve(vec![(
        404,
        r#"{"error":"not_found","reason":"Database does not exist."}"#.to_string(),
    )]);
    let db = Client::new(&base).expect("client").database("missing");

    let err = seed(&db, &[player("function(doc){}")]).unwrap_err();
    let seen = server.join().expect("server thread");

    assert_eq!(seen.len(), 1);
    assert!(err.as_couch().is_some_and(|e| e.is_not_found()), "got: {err}");
    assert!(err.to_string().contains("Database does not exist."));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };
    let db = Client::new(&format!("http://{addr}"))
        .expect("client")
        .database("game");

    let err = db.all_design_docs().unwrap_err();
    assert!(matches!(err, HttpError::Transport { .. }), "got: {err}");
}

#[test]
fn malformed_success_body_is_a_decode_error() {
    let (base, server) = serve(vec![(200, "not json".to_string())]);
    let db = Client::new(&base).expect("client").database("game");

    let err = db.get_design_doc("_design/player").unwrap_err();
    server.join().expect("server thread");
    assert!(matches!(err, HttpError::Decode { .. }), "got: {err}");
}
