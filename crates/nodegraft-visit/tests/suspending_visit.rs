use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use nodegraft_node::Node;
use nodegraft_test_utils::{diamond, json, self_referential_map, self_referential_seq, Spy};
use nodegraft_visit::{
    visit, visit_suspending, DirectResult, GraphVisitor, SuspendingResult, SuspendingTransform,
    Transform, VisitConfig,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;

type Answer<E> = Result<Option<SuspendingResult<E>>, E>;

#[derive(Debug, PartialEq, Eq)]
struct LookupFailed(String);

async fn yield_then_copy(_node: Node) -> Answer<Infallible> {
    tokio::task::yield_now().await;
    Ok(None)
}

/// Identity transform that yields to the scheduler before every answer
fn yielding() -> SuspendingTransform<Infallible> {
    SuspendingTransform::new(yield_then_copy)
}

#[tokio::test]
async fn suspending_identity_preserves_sharing() {
    let (root, shared) = diamond();
    let copy = visit_suspending(&root, &yielding()).await.unwrap();

    assert_eq!(copy, root);
    let a = copy.get("a").unwrap();
    assert!(!a.same(&shared));
    assert!(a.same(&copy.get("b").unwrap()));
    assert!(a.same(&copy.get("list").unwrap().at(0).unwrap()));
}

#[tokio::test]
async fn suspending_cycles_terminate() {
    let map = self_referential_map();
    let out = visit_suspending(&map, &yielding()).await.unwrap();
    assert!(out.get("self").unwrap().same(&out));

    let seq = self_referential_seq();
    let out = visit_suspending(&seq, &yielding()).await.unwrap();
    assert!(out.at(1).unwrap().same(&out));
}

async fn record_after_yield(order: Arc<Mutex<Vec<Node>>>, node: Node) -> Answer<Infallible> {
    tokio::task::yield_now().await;
    order.lock().push(node);
    Ok(None)
}

#[tokio::test]
async fn suspension_does_not_reorder_visits() {
    let source = json(json!({"a": [1, {"b": 2}], "c": {"d": [3, 4]}, "e": 5}));

    let direct_spy = Spy::new();
    visit(&source, &direct_spy.transform::<Infallible>()).unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&order);
    let t = SuspendingTransform::new(move |node| record_after_yield(Arc::clone(&recorded), node));
    visit_suspending(&source, &t).await.unwrap();

    let suspended = order.lock().clone();
    let direct = direct_spy.calls();
    assert_eq!(suspended.len(), direct.len());
    assert!(suspended.iter().zip(&direct).all(|(s, d)| s.same(d)));
}

/// Replaces flagged maps with a model built after a simulated remote lookup
async fn reconstruct(spy: Spy, node: Node) -> Answer<Infallible> {
    spy.record(&node);
    if node.get("_mustReconstruct").and_then(|n| n.as_bool()) != Some(true) {
        return Ok(None);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    let model = json(json!({"constructed": true}));
    if let Some(map) = model.as_map() {
        map.insert("kind", node.get("type").unwrap_or_default());
    }
    Ok(Some(SuspendingResult::replace(model)))
}

#[tokio::test(start_paused = true)]
async fn transform_may_await_before_replacing() {
    let source = json(json!({
        "plain": 1,
        "model": {"_mustReconstruct": true, "type": "user", "raw": {"deep": 1}},
    }));
    let spy = Spy::new();
    let seen = spy.clone();
    let t = SuspendingTransform::new(move |node| reconstruct(seen.clone(), node));

    let out = visit_suspending(&source, &t).await.unwrap();
    assert_eq!(
        out,
        json(json!({"plain": 1, "model": {"constructed": true, "kind": "user"}}))
    );
    let raw = source.get("model").unwrap().get("raw").unwrap();
    assert!(spy.was_called_on(&source.get("model").unwrap()));
    assert!(!spy.was_called_on(&raw));
}

async fn resolve_type(spy: Spy, node: Node) -> Answer<LookupFailed> {
    spy.record(&node);
    tokio::task::yield_now().await;
    match node.get("type").as_ref().and_then(Node::as_str) {
        Some(name) => Err(LookupFailed(name.to_string())),
        None => Ok(None),
    }
}

#[tokio::test]
async fn suspending_error_propagates() {
    let source = json(json!({"ok": 1, "missing": {"type": "ghost"}, "after": 2}));
    let spy = Spy::new();
    let seen = spy.clone();
    let t = SuspendingTransform::new(move |node| resolve_type(seen.clone(), node));

    let err = visit_suspending(&source, &t).await.unwrap_err();
    assert_eq!(err, LookupFailed("ghost".to_string()));
    assert!(!spy.was_called_on(&Node::from(2)));
}

async fn shout(node: Node) -> Answer<Infallible> {
    Ok(node
        .as_str()
        .map(|s| SuspendingResult::new().with_value(s.to_uppercase())))
}

async fn root_directives(is_root: bool) -> Answer<Infallible> {
    if !is_root {
        return Ok(None);
    }
    let result = SuspendingResult::new()
        .with_child_keys_filter(|key, _| key != "b")
        .with_key_mapper(|key| Some(format!("k_{key}")))
        .with_child_visitor(SuspendingTransform::new(shout))
        .with_post_visit(|rebuilt: Node| {
            if let Some(map) = rebuilt.as_map() {
                map.insert("done", true);
            }
            Ok(rebuilt)
        });
    Ok(Some(result))
}

#[tokio::test]
async fn directives_apply_in_suspending_mode() {
    let source = json(json!({"a": 1, "b": 2, "c": {"x": "y"}}));
    let root = source.clone();
    let t = SuspendingTransform::new(move |node: Node| root_directives(node.same(&root)));

    let out = visit_suspending(&source, &t).await.unwrap();
    assert_eq!(
        out,
        json(json!({"k_a": 1, "k_c": {"x": "Y"}, "done": true}))
    );
}

async fn stamp_after_delay(rebuilt: Node) -> Result<Node, Infallible> {
    tokio::time::sleep(Duration::from_millis(20)).await;
    if let Some(map) = rebuilt.as_map() {
        map.insert("built", true);
    }
    Ok(rebuilt)
}

async fn build_later(spy: Spy, node: Node) -> Answer<Infallible> {
    spy.record(&node);
    Ok(node
        .as_map()
        .map(|_| SuspendingResult::new().with_post_visit_async(stamp_after_delay)))
}

#[tokio::test(start_paused = true)]
async fn post_visit_may_suspend_without_reordering() {
    let source = json(json!({"a": {"b": 1}, "c": [{"d": 2}], "e": 3}));

    let direct_spy = Spy::new();
    let stamp = Transform::<Infallible>::new(|node| {
        Ok(node.as_map().map(|_| {
            DirectResult::new().with_post_visit(|rebuilt| {
                if let Some(map) = rebuilt.as_map() {
                    map.insert("built", true);
                }
                Ok(rebuilt)
            })
        }))
    });
    let expected = visit(&source, &direct_spy.wrap(stamp)).unwrap();

    let spy = Spy::new();
    let seen = spy.clone();
    let t = SuspendingTransform::new(move |node| build_later(seen.clone(), node));
    let out = visit_suspending(&source, &t).await.unwrap();

    assert_eq!(out, expected);
    assert_eq!(
        out,
        json(json!({
            "a": {"b": 1, "built": true},
            "c": [{"d": 2, "built": true}],
            "e": 3,
            "built": true
        }))
    );
    let (suspended, direct) = (spy.calls(), direct_spy.calls());
    assert_eq!(suspended.len(), direct.len());
    assert!(suspended.iter().zip(&direct).all(|(s, d)| s.same(d)));
}

async fn keep_unless_hidden(key: String, _source: Node) -> bool {
    tokio::task::yield_now().await;
    !key.starts_with('_')
}

async fn prefixed(key: String) -> Option<String> {
    tokio::task::yield_now().await;
    (key != "drop").then(|| format!("k_{key}"))
}

async fn suspending_names(node: Node) -> Answer<Infallible> {
    Ok(node.as_map().map(|_| {
        SuspendingResult::new()
            .with_child_keys_filter_async(keep_unless_hidden)
            .with_key_mapper_async(prefixed)
    }))
}

#[tokio::test]
async fn key_filter_and_mapper_may_suspend() {
    let source = json(json!({"a": 1, "_hidden": 2, "drop": 3, "n": {"_x": 4, "y": 5}}));
    let t = SuspendingTransform::new(suspending_names);

    let out = visit_suspending(&source, &t).await.unwrap();
    assert_eq!(out, json(json!({"k_a": 1, "k_n": {"k_y": 5}})));
}

async fn reject_rebuilt(_rebuilt: Node) -> Result<Node, LookupFailed> {
    tokio::task::yield_now().await;
    Err(LookupFailed("model".to_string()))
}

async fn reject_maps(node: Node) -> Answer<LookupFailed> {
    Ok(node
        .as_map()
        .map(|_| SuspendingResult::new().with_post_visit_async(reject_rebuilt)))
}

#[tokio::test]
async fn suspending_post_visit_error_propagates() {
    let source = json(json!({"x": 1}));
    let t = SuspendingTransform::new(reject_maps);

    let err = visit_suspending(&source, &t).await.unwrap_err();
    assert_eq!(err, LookupFailed("model".to_string()));
}

async fn never_runs(_rebuilt: Node) -> Result<Node, Infallible> {
    Ok(Node::from("async"))
}

async fn sync_overrides_async(node: Node) -> Answer<Infallible> {
    Ok(node.as_map().map(|_| {
        SuspendingResult::new()
            .with_post_visit_async(never_runs)
            .with_post_visit(|_| Ok(Node::from("sync")))
    }))
}

#[tokio::test]
async fn later_post_visit_replaces_earlier_one() {
    let t = SuspendingTransform::new(sync_overrides_async);
    let out = visit_suspending(&json(json!({})), &t).await.unwrap();
    assert_eq!(out, Node::from("sync"));
}

#[tokio::test]
async fn lifted_direct_transform_matches_direct_mode() {
    let source = json(json!({"a": {"b": [1, 2, 3]}, "drop": true, "c": "s"}));
    let negate = Transform::<Infallible>::new(|node| {
        Ok(node.as_i64().map(|n| DirectResult::new().with_value(-n)))
    });
    let direct = Transform::<Infallible>::new(move |node| {
        Ok(node.as_map().map(|_| {
            DirectResult::new()
                .with_key_mapper(|key| (key != "drop").then(|| key.to_string()))
                .with_child_visitor(negate.clone())
        }))
    });

    let expected = visit(&source, &direct).unwrap();
    let lifted = SuspendingTransform::from(direct);
    let actual = visit_suspending(&source, &lifted).await.unwrap();
    assert_eq!(actual, expected);
    assert_eq!(actual, json(json!({"a": {"b": [-1, -2, -3]}, "c": "s"})));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn disjoint_graphs_visit_concurrently() {
    let visitor = Arc::new(GraphVisitor::new(VisitConfig::default()));
    let mut handles = Vec::new();
    for n in 0..4u32 {
        let visitor = Arc::clone(&visitor);
        handles.push(tokio::spawn(async move {
            let source = json(json!({"n": n, "nested": {"n": n}}));
            let t = yielding();
            visitor.visit_suspending(&source, &t).await
        }));
    }

    for (n, handle) in handles.into_iter().enumerate() {
        let out = handle.await.unwrap().unwrap();
        assert_eq!(out, json(json!({"n": n, "nested": {"n": n}})));
    }
}

#[tokio::test]
async fn identity_suspending_transform_copies() {
    let source = json(json!([{"k": [true, null]}]));
    let out = visit_suspending(&source, &SuspendingTransform::<Infallible>::identity())
        .await
        .unwrap();
    assert_eq!(out, source);
    assert!(!out.same(&source));
}
