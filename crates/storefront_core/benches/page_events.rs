use criterion::{black_box, criterion_group, criterion_main, Criterion};
use storefront_core::Site;
use storefront_platform::headless::HeadlessHost;
use storefront_platform::PageEvent;

fn scroll_session(c: &mut Criterion) {
    c.bench_function("scroll_session_100_events", |b| {
        b.iter(|| {
            let mut host = HeadlessHost::new();
            host.set_metrics(10_000.0, 1_000.0);
            let mut site = Site::default();
            site.dispatch(&mut host, PageEvent::Ready);

            for step in 0..100 {
                host.scroll_to(f64::from(step) * 90.0);
                site.dispatch(&mut host, PageEvent::Scroll);
                if step % 3 == 0 && host.take_frame_request() {
                    site.dispatch(&mut host, PageEvent::AnimationFrame);
                }
            }
            black_box(host.reported().len())
        })
    });
}

fn dropdown_clicks(c: &mut Criterion) {
    let mut host = HeadlessHost::new();
    let body = host.body();
    let mut triggers = Vec::new();
    for _ in 0..8 {
        let container = host.element(body, "li", "dropdown");
        triggers.push(host.element(container, "button", "dropbtn"));
        let panel = host.element(container, "div", "dropdown-content");
        host.element(panel, "a", "");
    }
    let mut site = Site::default();
    site.dispatch(&mut host, PageEvent::Ready);

    c.bench_function("dropdown_trigger_click", |b| {
        let mut i = 0;
        b.iter(|| {
            let target = triggers[i % triggers.len()];
            i += 1;
            black_box(site.dispatch(&mut host, PageEvent::Click { target }))
        })
    });
}

criterion_group!(benches, scroll_session, dropdown_clicks);
criterion_main!(benches);
