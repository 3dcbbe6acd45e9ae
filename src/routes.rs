use crate::{
    api::{attendance, calendar, employee},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let punch_limiter = Arc::new(build_limiter(config.rate_punch_per_min));
    let api_limiter = Arc::new(build_limiter(config.rate_api_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(api_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::search_employees)),
                    )
                    // /employees/by-identification/{number}
                    .service(
                        web::resource("/by-identification/{number}")
                            .route(web::get().to(employee::get_by_identification)),
                    )
                    // /employees/{id}
                    .service(web::resource("/{id}").route(web::get().to(employee::get_employee)))
                    // /employees/{id}/contact
                    .service(
                        web::resource("/{id}/contact")
                            .route(web::put().to(employee::update_contact)),
                    )
                    // /employees/{id}/job
                    .service(web::resource("/{id}/job").route(web::get().to(employee::job_info))),
            )
            .service(
                web::scope("/calendar")
                    // /calendar
                    .service(web::resource("").route(web::put().to(calendar::upsert_entry)))
                    // /calendar/{employee_id}
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(calendar::list_entries)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance/punch, clock terminals get their own budget
                    .service(
                        web::resource("/punch")
                            .wrap(punch_limiter.clone())
                            .route(web::post().to(attendance::punch)),
                    )
                    // /attendance/manual
                    .service(web::resource("/manual").route(web::post().to(attendance::manual)))
                    // /attendance/hours/{employee_id}
                    .service(
                        web::resource("/hours/{employee_id}")
                            .route(web::get().to(attendance::monthly_hours)),
                    )
                    // /attendance/events/{employee_id}
                    .service(
                        web::resource("/events/{employee_id}")
                            .route(web::get().to(attendance::list_events)),
                    ),
            ),
    );
}
