use std::sync::{Arc, LazyLock};

use sql_mapper::prelude::*;

static POST: LazyLock<EntityShape> = LazyLock::new(|| {
    EntityShape::builder("Post")
        .table("blog_posts")
        .property("PostId", TypeShape::Scalar(ScalarKind::Int))
        .property("Title", TypeShape::Scalar(ScalarKind::Text))
        .finish()
});

#[test]
fn table_tag_wins_over_shape_name() {
    let registry = MapperRegistry::new();
    assert_eq!(registry.resolvers().table_name(&POST), "blog_posts");

    static UNTAGGED: LazyLock<EntityShape> = LazyLock::new(|| {
        EntityShape::builder("Comment")
            .property("Id", TypeShape::Scalar(ScalarKind::Int))
            .finish()
    });
    assert_eq!(registry.resolvers().table_name(&UNTAGGED), "Comment");
}

#[test]
fn typed_id_is_recognized_as_identity() {
    let registry = MapperRegistry::new();
    assert_eq!(
        registry.resolvers().identity(&POST).map(|p| p.name),
        Some("PostId")
    );
}

#[test]
fn snake_case_column_resolver_changes_projection_lookup() {
    static ARTICLE: LazyLock<EntityShape> = LazyLock::new(|| {
        EntityShape::builder("Article")
            .property("AuthorName", TypeShape::Scalar(ScalarKind::Text))
            .finish()
    });

    fn snake_case(name: &str) -> String {
        let mut out = String::new();
        for (i, c) in name.chars().enumerate() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    let registry = MapperRegistry::new();
    registry
        .resolvers()
        .set_column_name(Arc::new(|_, property| snake_case(property.name)))
        .unwrap();

    let mut cursor = VecCursor::new(
        &["author_name"],
        vec![vec![SqlValue::Text("iris".into())]],
    );
    let record = registry.read_record(&mut cursor, &ARTICLE).unwrap().unwrap();
    assert_eq!(
        record
            .get("AuthorName")
            .and_then(Value::as_sql)
            .and_then(SqlValue::as_text),
        Some("iris")
    );
}
