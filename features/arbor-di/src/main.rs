use std::rc::Rc;

use arbor_di::{
    container_ref, create_token, declare_service, declare_service_raw, Container,
    NamedDependencies, WeakContainer,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let db_url = create_token::<String>("db_url");
    let pool = create_token::<Rc<Pool>>("pool");
    let request_id = create_token::<u64>("request_id");

    let handler = declare_service(
        NamedDependencies::new()
            .with("pool", pool.clone())
            .with("request_id", request_id.clone()),
        |deps| Handler {
            pool: deps.get("pool"),
            request_id: deps.get("request_id"),
        },
    )
    .named("handler");

    let app = Container::new();
    app.register_value(&db_url, "postgres://localhost/app".to_string())
        .unwrap();
    app.register(
        &pool,
        declare_service_raw(|(url,): (String,)| Rc::new(Pool { url }), (db_url.clone(),)),
    )
    .unwrap();
    app.register_value(&request_id, 0).unwrap();

    let scope_of = declare_service_raw(
        |(container,): (WeakContainer,)| container,
        (container_ref((request_id.clone(),)),),
    );

    for id in 1..=2 {
        let request = app.create_child();
        request.register_value(&request_id, id).unwrap();

        let handler = request.get(&handler).unwrap();
        println!("{handler:?}");
        println!("scoped to request: {}", request.get(&scope_of).unwrap() == request);
    }

    println!("{app:?}");
}

#[derive(Debug)]
struct Pool {
    #[allow(dead_code)]
    url: String,
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct Handler {
    pool: Rc<Pool>,
    request_id: u64,
}
