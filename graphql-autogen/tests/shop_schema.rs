//! Compiles a scanner-produced descriptor document end to end

use graphql_autogen::ir::TypeDefinition;
use graphql_autogen::{
    CompilerConfig, DescriptorSet, GeneratorError, JsonScanner, ScanScope, Scanner, SchemaCompiler,
};
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop.json")
}

fn config() -> CompilerConfig {
    let mut config = CompilerConfig::for_packages(["com.example.shop"]);
    config.exclude_packages = vec!["com.example.shop.internal".to_string()];
    config
}

fn compile() -> graphql_autogen::CompiledSchema {
    let config = config();
    let descriptors = JsonScanner::from_config([fixture()], &config).scan().unwrap();
    SchemaCompiler::new(config).unwrap().compile(&descriptors).unwrap()
}

#[test]
fn test_scan_applies_scope() {
    let descriptors = JsonScanner::new([fixture()], ScanScope::from_config(&config()))
        .scan()
        .unwrap();
    assert!(descriptors.get("com.example.shop.model.Product").is_some());
    assert!(descriptors.get("com.example.shop.internal.AuditLog").is_none());
}

/// SDL with all whitespace runs collapsed to one space
fn flat(sdl: &str) -> String {
    sdl.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn test_shop_sdl() {
    let compiled = compile();
    assert!(compiled.diagnostics.is_empty(), "{:?}", compiled.diagnostics);
    compiled.check(true).unwrap();

    let sdl = compiled.to_sdl().unwrap();
    let compact = flat(&sdl);

    let product = "type Product implements Node { name: String! priceCents: Int tags: [String] \
                   category: Category status: ProductStatus createdAt: DateTime id: ID! }";
    assert!(compact.contains(product), "{}", sdl);
    assert!(compact.contains("\"A product for sale\" type Product"), "{}", sdl);

    let status = "enum ProductStatus { ACTIVE DISCONTINUED @deprecated(reason: \"Use ARCHIVED\") ARCHIVED }";
    assert!(compact.contains(status), "{}", sdl);

    let input = "input ProductInput { name: String! priceCents: Int = 0 status: ProductStatus = ACTIVE }";
    assert!(compact.contains(input), "{}", sdl);

    assert!(compact.contains("createProduct(input: ProductInput!): Product @auth(roles: [\"ADMIN\"])"), "{}", sdl);
    assert!(compact.contains("deleteProduct(id: Int!): Boolean"), "{}", sdl);
    assert!(compact.contains("type Subscription { productUpdated: Product }"), "{}", sdl);
    assert!(sdl.contains("directive @auth(roles: [String!], permissions: [String!]) on FIELD_DEFINITION\n"));
    assert!(compact.contains("scalar DateTime"));
    assert!(!sdl.contains("AuditLog"));
    assert!(!sdl.contains("secret"));
    assert!(!sdl.contains("DRAFT"));
}

#[test]
fn test_shop_pagination_and_loaders() {
    let compiled = compile();
    let schema = &compiled.schema;

    let products = schema.query.field("products").unwrap();
    assert_eq!(products.ty.to_string(), "ProductConnection");
    let arguments: Vec<&str> = products.arguments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(arguments, vec!["first", "after", "last", "before"]);

    let Some(TypeDefinition::Object(category)) = schema.get("Category") else {
        panic!("Category is not an object");
    };
    let paged = category.field("products").unwrap();
    assert_eq!(paged.ty.to_string(), "[Product]");
    let arguments: Vec<&str> = paged.arguments.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(arguments, vec!["limit", "offset"]);

    for name in ["PageInfo", "ProductConnection", "ProductEdge"] {
        assert!(schema.get(name).is_some(), "missing {}", name);
    }

    assert_eq!(compiled.pagination.len(), 2);
    assert_eq!(compiled.data_loaders.len(), 1);
    let loader = &compiled.data_loaders[0];
    assert_eq!(loader.name, "categoryDataLoader");
    assert_eq!(loader.key_property, "categoryId");
    assert_eq!(loader.batch_size, 50);
}

#[test]
fn test_shop_is_deterministic() {
    assert_eq!(compile().to_sdl().unwrap(), compile().to_sdl().unwrap());
}

#[test]
fn test_unknown_base_package_yields_placeholder_query() {
    let descriptors = DescriptorSet::from_json(&std::fs::read_to_string(fixture()).unwrap()).unwrap();
    let compiled = SchemaCompiler::new(CompilerConfig::for_packages(["org.elsewhere"]))
        .unwrap()
        .compile(&descriptors)
        .unwrap();
    assert_eq!(compiled.schema.query.fields.len(), 1);
    let sdl = compiled.to_sdl().unwrap();
    assert!(flat(&sdl).contains("\"Placeholder field: no queries are defined\" _empty: String"), "{}", sdl);
    assert!(!sdl.contains("type Mutation"));
    assert!(!sdl.contains("type Subscription"));
}

#[test]
fn test_malformed_document_is_parse_error() {
    let err = DescriptorSet::from_json("{\"types\": [{\"kind\": \"class\"}]}").unwrap_err();
    assert!(matches!(err, GeneratorError::Parse(_)));
}
