use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use color_eyre::eyre::eyre;
use pretty_assertions::assert_eq;
use rstest::*;

use elmloop::{Cmd, Dispatch, Event, Renderer, Result, Runtime, Sub, Watch};

#[derive(Debug, Clone, PartialEq)]
struct Model {
    count: i32,
}

#[derive(Debug, Clone, PartialEq)]
enum Msg {
    Add(i32),
    Same,
    AddThenEcho(i32, i32),
    FailInCmd(i32),
}

/// Shared log of everything the collaborators observed, in call order
type Journal = Rc<RefCell<Vec<String>>>;

fn update(journal: Journal) -> impl Fn(Msg, &Model) -> Result<(Model, Cmd<Msg>)> {
    move |msg, model| {
        journal.borrow_mut().push(format!("update {msg:?}"));
        let out = match msg {
            Msg::Add(n) => (
                Model {
                    count: model.count + n,
                },
                Cmd::none(),
            ),
            Msg::Same => (model.clone(), Cmd::none()),
            Msg::AddThenEcho(n, echo) => {
                let journal = Rc::clone(&journal);
                (
                    Model {
                        count: model.count + n,
                    },
                    Cmd::perform(move |dispatch| {
                        journal.borrow_mut().push("cmd".to_string());
                        dispatch.dispatch(Msg::Add(echo))
                    }),
                )
            }
            Msg::FailInCmd(n) => (
                Model {
                    count: model.count + n,
                },
                Cmd::perform(|_| Err(eyre!("cmd failed"))),
            ),
        };
        Ok(out)
    }
}

struct JournalRenderer {
    journal: Journal,
    fail_on: Option<i32>,
    inits: Rc<Cell<usize>>,
}

impl Renderer<Model, Msg> for JournalRenderer {
    fn init(&mut self, _dispatch: Dispatch<Msg>) -> Result<()> {
        self.inits.set(self.inits.get() + 1);
        self.journal.borrow_mut().push("init".to_string());
        Ok(())
    }

    fn render(&mut self, model: &Model) -> Result<()> {
        if self.fail_on == Some(model.count) {
            return Err(eyre!("render failed"));
        }
        self.journal
            .borrow_mut()
            .push(format!("render {}", model.count));
        Ok(())
    }
}

/// Source counting how often the runtime wires and unwires it
#[derive(Default)]
struct CountingSource {
    journal: Option<Journal>,
    attaches: Cell<usize>,
    detaches: Cell<usize>,
    handlers: RefCell<Vec<Dispatch<Msg>>>,
}

impl Watch<Msg> for CountingSource {
    fn attach(&self, dispatch: &Dispatch<Msg>) -> Result<()> {
        self.attaches.set(self.attaches.get() + 1);
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push("attach".to_string());
        }
        self.handlers.borrow_mut().push(dispatch.clone());
        Ok(())
    }

    fn detach(&self, dispatch: &Dispatch<Msg>) {
        self.detaches.set(self.detaches.get() + 1);
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push("detach".to_string());
        }
        self.handlers.borrow_mut().retain(|d| !d.ptr_eq(dispatch));
    }
}

struct Fixture {
    runtime: Runtime<Model, Msg>,
    journal: Journal,
    source: Rc<CountingSource>,
    inits: Rc<Cell<usize>>,
}

fn fixture(fail_on: Option<i32>) -> Fixture {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let inits = Rc::new(Cell::new(0));
    let source = Rc::new(CountingSource {
        journal: Some(Rc::clone(&journal)),
        ..Default::default()
    });
    let watched = Rc::clone(&source);
    let runtime = Runtime::with_subscription(
        || (Model { count: 0 }, Cmd::none()),
        update(Rc::clone(&journal)),
        JournalRenderer {
            journal: Rc::clone(&journal),
            fail_on,
            inits: Rc::clone(&inits),
        },
        move |_: &Model| Sub::watch(Rc::clone(&watched) as Rc<dyn Watch<Msg>>),
    )
    .expect("runtime should start");
    journal.borrow_mut().clear();
    Fixture {
        runtime,
        journal,
        source,
        inits,
    }
}

#[test]
fn test_initial_render_happens_once() {
    let f = fixture(None);
    assert_eq!(f.inits.get(), 1);
    assert_eq!(f.runtime.stats().renders, 1);
    assert_eq!(f.source.attaches.get(), 1);
    assert_eq!(f.source.detaches.get(), 0);
}

#[test]
fn test_construction_order() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&journal);
    let source = Rc::new(CountingSource {
        journal: Some(Rc::clone(&journal)),
        ..Default::default()
    });
    let _runtime = Runtime::with_subscription(
        move || {
            let cmd = Cmd::perform(move |_: &Dispatch<Msg>| {
                sink.borrow_mut().push("initial cmd".to_string());
                Ok(())
            });
            (Model { count: 0 }, cmd)
        },
        update(Rc::clone(&journal)),
        JournalRenderer {
            journal: Rc::clone(&journal),
            fail_on: None,
            inits: Rc::new(Cell::new(0)),
        },
        move |_: &Model| Sub::watch(Rc::clone(&source) as Rc<dyn Watch<Msg>>),
    )
    .unwrap();

    assert_eq!(
        *journal.borrow(),
        vec!["initial cmd", "init", "render 0", "attach"]
    );
}

#[rstest]
#[case(vec![Msg::Same], 0)]
#[case(vec![Msg::Same, Msg::Same, Msg::Same], 0)]
#[case(vec![Msg::Add(0)], 0)]
#[case(vec![Msg::Add(1), Msg::Same], 1)]
#[case(vec![Msg::Add(1), Msg::Add(-1)], 2)]
fn test_renders_only_on_change(#[case] msgs: Vec<Msg>, #[case] renders: u64) {
    let f = fixture(None);
    for msg in msgs {
        f.runtime.dispatch(msg).unwrap();
    }
    assert_eq!(f.runtime.stats().renders - 1, renders);
}

#[test]
fn test_single_render_before_cmd() {
    let f = fixture(None);
    f.runtime.dispatch(Msg::AddThenEcho(1, 0)).unwrap();
    assert_eq!(
        *f.journal.borrow(),
        vec![
            "update AddThenEcho(1, 0)",
            "render 1",
            "cmd",
            // nested dispatch of Add(0): no change, no render
            "update Add(0)",
            "detach",
            "attach",
            // outer dispatch resumes with its own rewiring
            "detach",
            "attach",
        ]
    );
}

#[test]
fn test_nested_dispatch_completes_before_outer_rewiring() {
    let f = fixture(None);
    f.runtime.dispatch(Msg::AddThenEcho(1, 10)).unwrap();
    assert_eq!(
        *f.journal.borrow(),
        vec![
            "update AddThenEcho(1, 10)",
            "render 1",
            "cmd",
            "update Add(10)",
            "render 11",
            "detach",
            "attach",
            "detach",
            "attach",
        ]
    );
    assert_eq!(f.runtime.model(), Model { count: 11 });
}

#[test]
fn test_rewiring_is_unconditional() {
    let f = fixture(None);
    for (i, msg) in [Msg::Same, Msg::Add(1), Msg::Same, Msg::Add(0)]
        .into_iter()
        .enumerate()
    {
        f.runtime.dispatch(msg).unwrap();
        assert_eq!(f.source.attaches.get(), i + 2);
        assert_eq!(f.source.detaches.get(), i + 1);
        assert_eq!(f.source.handlers.borrow().len(), 1);
    }
}

#[test]
fn test_render_failure_leaves_model_unchanged() {
    let f = fixture(Some(5));
    let err = f.runtime.dispatch(Msg::Add(5)).unwrap_err();
    assert_eq!(err.to_string(), "render failed");
    assert_eq!(f.runtime.model(), Model { count: 0 });
    // the cycle was aborted before rewiring
    assert_eq!(f.source.attaches.get(), 1);
}

#[test]
fn test_cmd_failure_leaves_model_advanced() {
    let f = fixture(None);
    let err = f.runtime.dispatch(Msg::FailInCmd(3)).unwrap_err();
    assert_eq!(err.to_string(), "cmd failed");
    assert_eq!(f.runtime.model(), Model { count: 3 });
    assert_eq!(f.source.attaches.get(), 1);
}

#[test]
fn test_source_fires_through_attached_handler() {
    let f = fixture(None);
    let handler = f.source.handlers.borrow()[0].clone();
    handler.dispatch(Msg::Add(2)).unwrap();
    assert_eq!(f.runtime.model(), Model { count: 2 });
    assert_eq!(f.source.attaches.get(), 2);
}

#[test]
fn test_drop_detaches_subscription() {
    let f = fixture(None);
    let source = Rc::clone(&f.source);
    drop(f);
    assert_eq!(source.detaches.get(), 1);
    assert!(source.handlers.borrow().is_empty());
}

#[test]
fn test_renderer_dispatching_while_rendering_is_reported() {
    struct Reentrant {
        dispatch: Option<Dispatch<Msg>>,
    }

    impl Renderer<Model, Msg> for Reentrant {
        fn init(&mut self, dispatch: Dispatch<Msg>) -> Result<()> {
            self.dispatch = Some(dispatch);
            Ok(())
        }

        fn render(&mut self, model: &Model) -> Result<()> {
            match (&self.dispatch, model.count) {
                (Some(dispatch), 1) => dispatch.dispatch(Msg::Add(1)),
                _ => Ok(()),
            }
        }
    }

    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let runtime = Runtime::new(
        || (Model { count: 0 }, Cmd::none()),
        update(journal),
        Reentrant { dispatch: None },
    )
    .unwrap();

    let err = runtime.dispatch(Msg::Add(1)).unwrap_err();
    assert!(err.to_string().contains("while rendering"));
    assert_eq!(runtime.model(), Model { count: 0 });
}

#[test]
fn test_renderer_dispatches_through_init_handle() {
    struct Remote {
        handle: Rc<RefCell<Option<Dispatch<Msg>>>>,
        journal: Journal,
    }

    impl Renderer<Model, Msg> for Remote {
        fn init(&mut self, dispatch: Dispatch<Msg>) -> Result<()> {
            *self.handle.borrow_mut() = Some(dispatch);
            Ok(())
        }

        fn render(&mut self, model: &Model) -> Result<()> {
            self.journal
                .borrow_mut()
                .push(format!("render {}", model.count));
            Ok(())
        }
    }

    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let handle = Rc::new(RefCell::new(None));
    let runtime = Runtime::new(
        || (Model { count: 0 }, Cmd::none()),
        update(Rc::clone(&journal)),
        Remote {
            handle: Rc::clone(&handle),
            journal: Rc::clone(&journal),
        },
    )
    .unwrap();

    // e.g. a key press handled by the view layer
    let dispatch = handle.borrow().clone().expect("handle received in init");
    dispatch.dispatch(Msg::Add(3)).unwrap();

    assert_eq!(runtime.model(), Model { count: 3 });
    assert_eq!(
        *journal.borrow(),
        vec!["render 0", "update Add(3)", "render 3"]
    );
    assert_eq!(runtime.stats().dispatches, 1);
}

#[test]
fn test_failed_batch_attach_leaves_no_handlers_behind() {
    /// Source whose attach can be switched to fail
    #[derive(Default)]
    struct Flaky {
        failing: Cell<bool>,
    }

    impl Watch<Msg> for Flaky {
        fn attach(&self, _dispatch: &Dispatch<Msg>) -> Result<()> {
            if self.failing.get() {
                return Err(eyre!("source unavailable"));
            }
            Ok(())
        }

        fn detach(&self, _dispatch: &Dispatch<Msg>) {}
    }

    let event: Rc<Event<Msg>> = Rc::new(Event::new());
    let flaky = Rc::new(Flaky::default());
    let (watched, switch) = (Rc::clone(&event), Rc::clone(&flaky));
    let runtime = Runtime::with_subscription(
        || (Model { count: 0 }, Cmd::none()),
        update(Rc::new(RefCell::new(Vec::new()))),
        |_: &Model| -> Result<()> { Ok(()) },
        move |_: &Model| {
            Sub::batch(vec![
                Sub::watch(Rc::clone(&watched) as Rc<dyn Watch<Msg>>),
                Sub::watch(Rc::clone(&switch) as Rc<dyn Watch<Msg>>),
            ])
        },
    )
    .unwrap();
    assert_eq!(event.handler_count(), 1);

    flaky.failing.set(true);
    let err = runtime.dispatch(Msg::Add(1)).unwrap_err();
    assert_eq!(err.to_string(), "source unavailable");
    assert_eq!(event.handler_count(), 0);

    flaky.failing.set(false);
    runtime.dispatch(Msg::Add(1)).unwrap();
    assert_eq!(event.handler_count(), 1);

    // one raise reaches the runtime exactly once
    event.raise(Msg::Add(1)).unwrap();
    assert_eq!(runtime.model(), Model { count: 3 });
    assert_eq!(event.handler_count(), 1);
}
