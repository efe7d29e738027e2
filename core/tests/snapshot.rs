use std::fs;
use validgen_core::store::{Project, StoreRecord};
use validgen_core::{
    publish_snapshot, resolve_routes, GenerateConfig, JsonFileStore, SnapshotOutcome,
    SnapshotStore,
};

const ROUTER: &str = r#"package routers

import (
	"github.com/astaxie/beego"
	"shop/controllers"
)

func init() {
	beego.AddNamespace(beego.NewNamespace("/v1", beego.NSInclude(&controllers.OrderController{})))
}
"#;

fn controller(extra: &str) -> String {
    format!(
        r#"package controllers

type OrderController struct{{}}

// @Param page query int false "page number"
// @router /orders [get]
func (c *OrderController) List() {{
}}
{}"#,
        extra
    )
}

#[test]
fn test_snapshot_versions_follow_route_changes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("go.mod"), "module shop\n").unwrap();
    fs::create_dir_all(dir.path().join("routers")).unwrap();
    fs::create_dir_all(dir.path().join("controllers")).unwrap();
    fs::write(dir.path().join("routers/router.go"), ROUTER).unwrap();
    fs::write(dir.path().join("controllers/order.go"), controller("")).unwrap();

    let config = GenerateConfig {
        project_root: dir.path().to_path_buf(),
        search_roots: vec![dir.path().join("gopath")],
        ..Default::default()
    };
    let mut store = JsonFileStore::new(dir.path().join(".validgen"));
    store
        .insert(vec![StoreRecord::Project(Project::new("shop", "shop.local"))])
        .unwrap();

    let table = resolve_routes(&config).unwrap();
    let first = publish_snapshot(&mut store, "shop.local", &table).unwrap();
    assert!(matches!(first, SnapshotOutcome::Published { ref version, .. } if version == "1.0"));

    let table = resolve_routes(&config).unwrap();
    let same = publish_snapshot(&mut store, "shop.local", &table).unwrap();
    assert!(matches!(same, SnapshotOutcome::Unchanged { .. }));

    fs::write(
        dir.path().join("controllers/order.go"),
        controller("\n// @router /orders/:id [delete]\nfunc (c *OrderController) Delete(id int) {\n}\n"),
    )
    .unwrap();
    let table = resolve_routes(&config).unwrap();
    let changed = publish_snapshot(&mut store, "shop.local", &table).unwrap();
    assert!(matches!(changed, SnapshotOutcome::Published { ref version, .. } if version == "1.1"));

    let saved = fs::read_to_string(dir.path().join(".validgen/swagger_location.json")).unwrap();
    assert!(saved.contains("/v1/orders/{id}"));
}
