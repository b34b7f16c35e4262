use std::sync::mpsc::{Receiver, Sender, channel};

use gss_inquire::{
    Credentials,
    client::{ClientBuilder, StepOut as ClientStepOut},
    server::{ServerContext, StepOut as ServerStepOut},
};

// Needs a reachable KDC, a ticket for the calling user and a keytab for
// KERBEROS_TEST_SERVICE_PRINCIPAL (service@host form).

#[test]
#[ignore = "needs a KDC, a user ticket and a service keytab"]
fn both_sides_see_the_same_session_key() {
    let service_principal = std::env::var("KERBEROS_TEST_SERVICE_PRINCIPAL").unwrap();
    let (to_server, from_client) = channel::<Vec<u8>>();
    let (to_client, from_server) = channel::<Vec<u8>>();

    let acceptor = std::thread::spawn(|| server(from_client, to_client));

    let cred = Credentials::outbound(None, None).unwrap();
    let mut stepped = ClientBuilder::new(cred, &service_principal)
        .unwrap()
        .request_mutual_auth()
        .initialize()
        .unwrap();
    let client_ctx = loop {
        match stepped {
            ClientStepOut::Established(ctx) => break ctx,
            ClientStepOut::Pending(pending) => {
                eprintln!("[CLIENT] sending token");
                to_server.send(pending.next_token().to_vec()).unwrap();
                let answer = from_server.recv().unwrap();
                eprintln!("[CLIENT] answer received");
                stepped = pending.step(&answer).unwrap();
            }
        }
    };
    assert!(client_ctx.is_mutually_authenticated());
    drop(to_server);

    let server_key = acceptor.join().unwrap();
    let client_key = client_ctx.session_key().unwrap();
    eprintln!("[CLIENT] {client_key}");
    assert!(!client_key.is_empty());
    assert_eq!(client_key.as_slice(), server_key.as_slice());
    assert_eq!(client_key.etype(), server_key.etype());
}

fn server(from_client: Receiver<Vec<u8>>, to_client: Sender<Vec<u8>>) -> gss_inquire::SessionKey {
    let cred = Credentials::inbound(None, None).unwrap();
    let token = from_client.recv().unwrap();
    let server_ctx = 'ctx: {
        let mut pending = match ServerContext::accept(cred, &token).unwrap() {
            ServerStepOut::Established(ctx) => break 'ctx ctx,
            ServerStepOut::Pending(pending) => pending,
        };
        loop {
            eprintln!("[SERVER] answering");
            to_client.send(pending.next_token().to_vec()).unwrap();
            let token = from_client.recv().unwrap();
            pending = match pending.step(&token).unwrap() {
                ServerStepOut::Established(ctx) => break 'ctx ctx,
                ServerStepOut::Pending(pending) => pending,
            };
        }
    };
    if let Some(token) = server_ctx.last_token() {
        eprintln!("[SERVER] sending mutual auth answer");
        to_client.send(token.to_vec()).unwrap();
    }
    if let Some(initiator) = server_ctx.initiator() {
        eprintln!("[SERVER] initiator: {initiator}");
    }
    server_ctx.session_key().unwrap()
}
