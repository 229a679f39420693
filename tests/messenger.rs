use std::sync::{Arc, Mutex};

use msgbus::{Handler, MessageBus, Receiver};
use rstest::{fixture, rstest};

#[derive(Debug, Clone)]
struct Ping;

#[derive(Debug, Clone)]
struct Pong;

/// Журнал вызовов обработчиков, общий для теста.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn mark<T: 'static>(
        &self,
        tag: &'static str,
    ) -> impl Fn(&T) + Send + Sync + 'static {
        let inner = self.0.clone();
        move |_: &T| inner.lock().unwrap().push(tag)
    }

    fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[fixture]
fn bus() -> MessageBus {
    MessageBus::new()
}

/// Глобальный A и адресный B на Ping, глобальный C на Pong.
/// После `unregister_type_for::<Ping>("r1")` Ping получает только A.
#[rstest]
fn test_ping_pong_scenario(bus: MessageBus) {
    let journal = Journal::default();
    bus.register_global(journal.mark::<Ping>("A"));
    bus.register("r1", journal.mark::<Ping>("B"));
    bus.register_global(journal.mark::<Pong>("C"));

    assert_eq!(bus.send(Ping).unwrap(), 2);
    assert_eq!(journal.take(), ["A", "B"]);

    assert_eq!(bus.unregister_type_for::<Ping>("r1"), 1);
    assert_eq!(bus.send(Ping).unwrap(), 1);
    assert_eq!(journal.take(), ["A"]);

    assert_eq!(bus.send(Pong).unwrap(), 1);
    assert_eq!(journal.take(), ["C"]);
}

/// Каждая подписка вызывается ровно один раз, независимо от получателя.
#[rstest]
#[case::global(Receiver::global())]
#[case::named(Receiver::named("view"))]
#[case::instance(Receiver::instance(&Arc::new(7_u32)))]
fn test_send_reaches_any_receiver_once(
    bus: MessageBus,
    #[case] receiver: Receiver,
) {
    let journal = Journal::default();
    bus.register(receiver, journal.mark::<Ping>("h"));
    bus.register("other", journal.mark::<Pong>("wrong-type"));

    bus.send(Ping).unwrap();
    assert_eq!(journal.take(), ["h"]);
}

#[rstest]
fn test_unregister_receiver_removes_all_types(bus: MessageBus) {
    let journal = Journal::default();
    bus.register("r1", journal.mark::<Ping>("r1-ping"));
    bus.register("r1", journal.mark::<Pong>("r1-pong"));
    bus.register("r2", journal.mark::<Ping>("r2-ping"));

    assert_eq!(bus.unregister("r1"), 2);
    bus.send(Ping).unwrap();
    bus.send(Pong).unwrap();
    assert_eq!(journal.take(), ["r2-ping"]);
}

#[rstest]
fn test_unregister_type_keeps_other_types(bus: MessageBus) {
    let journal = Journal::default();
    bus.register("r1", journal.mark::<Ping>("ping"));
    bus.register("r1", journal.mark::<Pong>("pong"));
    bus.register_global(journal.mark::<Ping>("global-ping"));

    assert_eq!(bus.unregister_type::<Ping>(), 2);
    bus.send(Ping).unwrap();
    bus.send(Pong).unwrap();
    assert_eq!(journal.take(), ["pong"]);
}

#[rstest]
fn test_unregister_global_keeps_scoped(bus: MessageBus) {
    let journal = Journal::default();
    bus.register_global(journal.mark::<Ping>("g1"));
    bus.register("r1", journal.mark::<Ping>("scoped"));
    bus.register_global(journal.mark::<Pong>("g2"));

    assert_eq!(bus.unregister_global(), 2);
    bus.send(Ping).unwrap();
    bus.send(Pong).unwrap();
    assert_eq!(journal.take(), ["scoped"]);
}

/// Отписка по обработчику не трогает другой обработчик того же получателя.
#[rstest]
fn test_unregister_handler_leaves_sibling(bus: MessageBus) {
    let journal = Journal::default();
    let first = Handler::new(journal.mark::<Ping>("first"));
    let second = Handler::new(journal.mark::<Ping>("second"));
    bus.register_handler("r1", first.clone()).unwrap();
    bus.register_handler("r1", second).unwrap();
    bus.register_handler(Receiver::global(), first.clone()).unwrap();

    assert_eq!(bus.unregister_handler(&first), 2);
    bus.send(Ping).unwrap();
    assert_eq!(journal.take(), ["second"]);
}

#[rstest]
fn test_unregister_handler_for_scopes_by_receiver(bus: MessageBus) {
    let journal = Journal::default();
    let shared = Handler::new(journal.mark::<Ping>("shared"));
    bus.register_handler("r1", shared.clone()).unwrap();
    bus.register_handler("r2", shared.clone()).unwrap();

    assert_eq!(bus.unregister_handler_for("r1", &shared), 1);
    bus.send(Ping).unwrap();
    assert_eq!(journal.take(), ["shared"]);
    assert_eq!(bus.receivers(), vec![Receiver::named("r2")]);
}

/// Повторная отписка с теми же аргументами является безопасным no-op.
#[rstest]
fn test_unregister_is_idempotent(bus: MessageBus) {
    let h = Handler::new(|_: &Ping| {});
    bus.register_handler("r1", h.clone()).unwrap();
    bus.register_global(|_: &Pong| {});
    bus.register("r2", |_: &Ping| {});

    assert_eq!(bus.unregister_handler_for("r1", &h), 1);
    assert_eq!(bus.unregister_handler_for("r1", &h), 0);
    assert_eq!(bus.unregister_type::<Pong>(), 1);
    assert_eq!(bus.unregister_type::<Pong>(), 0);
    assert_eq!(bus.unregister("r2"), 1);
    assert_eq!(bus.unregister("r2"), 0);
    assert_eq!(bus.unregister_global(), 0);
    assert!(bus.is_empty());
}

/// Отписка сохраняет относительный порядок оставшихся подписок.
#[rstest]
fn test_removal_preserves_order(bus: MessageBus) {
    let journal = Journal::default();
    bus.register("a", journal.mark::<Ping>("1"));
    bus.register("b", journal.mark::<Ping>("2"));
    bus.register("a", journal.mark::<Ping>("3"));
    bus.register("c", journal.mark::<Ping>("4"));
    bus.register("b", journal.mark::<Ping>("5"));

    bus.unregister("b");
    bus.send(Ping).unwrap();
    assert_eq!(journal.take(), ["1", "3", "4"]);
}

/// Объект-получатель сравнивается по идентичности, а не по значению.
#[rstest]
fn test_instance_receivers_are_distinct(bus: MessageBus) {
    let journal = Journal::default();
    let page_a = Arc::new(String::from("page"));
    let page_b = Arc::new(String::from("page"));
    bus.register(Receiver::instance(&page_a), journal.mark::<Ping>("a"));
    bus.register(Receiver::instance(&page_b), journal.mark::<Ping>("b"));

    assert_eq!(bus.unregister(Receiver::instance(&page_a)), 1);
    bus.send(Ping).unwrap();
    assert_eq!(journal.take(), ["b"]);
}

/// Пока подписка жива, шина удерживает объект получателя.
#[rstest]
fn test_registry_holds_receiver_until_unregistered(bus: MessageBus) {
    let owner = Arc::new(());
    bus.register(Receiver::instance(&owner), |_: &Ping| {});
    assert_eq!(Arc::strong_count(&owner), 2);

    bus.unregister(Receiver::instance(&owner));
    assert_eq!(Arc::strong_count(&owner), 1);
}

#[rstest]
fn test_separate_buses_are_isolated() {
    let left = MessageBus::new();
    let right = MessageBus::new();
    let journal = Journal::default();
    left.register_global(journal.mark::<Ping>("left"));

    assert_eq!(right.send(Ping).unwrap(), 0);
    assert!(journal.take().is_empty());
    assert_eq!(left.send(Ping).unwrap(), 1);
}
