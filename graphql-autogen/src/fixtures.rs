//! Shared test descriptors: a small library domain

use crate::descriptor::{
    DescriptorSet, EnumValueDescriptor, FieldDescriptor, MethodDescriptor, ParameterDescriptor,
    TypeDescriptor, TypeKind, TypeSignature,
};
use crate::markers::{
    ArgumentMarker, ControllerMarker, DataLoaderMarker, EnumValueMarker, FieldMarker, IdMarker,
    InputFieldMarker, Marker, OperationMarker, PaginationMarker, SubscriptionFilterMarker,
    TypeMarker, UnionMarker,
};

pub const AUDITABLE: &str = "com.example.library.model.Auditable";
pub const ENTITY: &str = "com.example.library.model.Entity";
pub const BOOK: &str = "com.example.library.model.Book";
pub const AUTHOR: &str = "com.example.library.model.Author";
pub const BOOK_STATUS: &str = "com.example.library.model.BookStatus";
pub const ISBN: &str = "com.example.library.model.Isbn";
pub const REVIEW: &str = "com.example.library.model.Review";
pub const SEARCH_RESULT: &str = "com.example.library.model.SearchResult";
pub const BOOK_FILTER: &str = "com.example.library.model.BookFilter";
pub const CREATE_BOOK_INPUT: &str = "com.example.library.model.CreateBookRequest";
pub const BOOK_CONTROLLER: &str = "com.example.library.web.BookController";
pub const AUTHOR_CONTROLLER: &str = "com.example.library.web.AuthorController";

pub fn string() -> TypeSignature {
    TypeSignature::class("java.lang.String")
}

pub fn object() -> Marker {
    Marker::Object(TypeMarker::default())
}

pub fn auditable() -> TypeDescriptor {
    TypeDescriptor::new(AUDITABLE, TypeKind::Interface)
        .with_marker(Marker::Interface(TypeMarker::default()))
        .with_method(MethodDescriptor::new(
            "getCreatedAt",
            TypeSignature::class("java.time.LocalDateTime"),
        ))
}

pub fn entity() -> TypeDescriptor {
    let mut entity = TypeDescriptor::new(ENTITY, TypeKind::Class)
        .with_marker(Marker::Interface(TypeMarker {
            name: Some("Node".into()),
            description: Some("An object with a stable identifier".into()),
            ..Default::default()
        }))
        .with_interface(AUDITABLE)
        .with_field(
            FieldDescriptor::new("id", TypeSignature::class("java.lang.Long"))
                .with_marker(Marker::Id(IdMarker::default())),
        );
    entity.is_abstract = true;
    entity
}

pub fn book() -> TypeDescriptor {
    let mut count = FieldDescriptor::new("COUNT", TypeSignature::primitive("int"));
    count.is_static = true;
    let mut outer = FieldDescriptor::new("this$0", TypeSignature::class("java.lang.Object"));
    outer.synthetic = true;

    TypeDescriptor::new(BOOK, TypeKind::Class)
        .with_marker(Marker::Object(TypeMarker {
            description: Some("A book in the catalogue".into()),
            ..Default::default()
        }))
        .with_superclass(ENTITY)
        .with_field(
            FieldDescriptor::new("title", string()).with_marker(Marker::Field(FieldMarker {
                nullable: false,
                ..Default::default()
            })),
        )
        .with_field(FieldDescriptor::new("isbn", TypeSignature::class(ISBN)))
        .with_field(FieldDescriptor::new("status", TypeSignature::enumeration(BOOK_STATUS)))
        .with_field(FieldDescriptor::new(
            "publishedOn",
            TypeSignature::class("java.time.LocalDate"),
        ))
        .with_field(FieldDescriptor::new("tags", TypeSignature::list_of(string())))
        .with_field(
            FieldDescriptor::new("author", TypeSignature::class(AUTHOR))
                .with_marker(Marker::DataLoader(DataLoaderMarker::default())),
        )
        .with_field(
            FieldDescriptor::new("legacyCode", string()).with_marker(Marker::Field(FieldMarker {
                name: Some("code".into()),
                deprecation_reason: Some("Use isbn".into()),
                ..Default::default()
            })),
        )
        .with_field(FieldDescriptor::new("internalNotes", string()).with_marker(Marker::Ignore))
        .with_field(count)
        .with_field(outer)
        .with_method(MethodDescriptor::new("getPageCount", TypeSignature::primitive("int")))
        .with_method(MethodDescriptor::new("isAvailable", TypeSignature::primitive("boolean")))
        .with_method(MethodDescriptor::new("getTitle", string()))
        .with_method(
            MethodDescriptor::new("summarize", string())
                .with_parameter(ParameterDescriptor::new("length", TypeSignature::primitive("int"))),
        )
}

pub fn author() -> TypeDescriptor {
    TypeDescriptor::new(AUTHOR, TypeKind::Class)
        .with_marker(object())
        .with_superclass(ENTITY)
        .with_field(FieldDescriptor::new("name", string()))
        .with_field(
            FieldDescriptor::new("books", TypeSignature::list_of(TypeSignature::class(BOOK)))
                .with_marker(Marker::Pagination(PaginationMarker::default()))
                .with_marker(Marker::DataLoader(DataLoaderMarker::default())),
        )
}

pub fn book_status() -> TypeDescriptor {
    TypeDescriptor::new(BOOK_STATUS, TypeKind::Enum)
        .with_marker(Marker::Enum(TypeMarker::default()))
        .with_enum_value(EnumValueDescriptor::new("AVAILABLE"))
        .with_enum_value(EnumValueDescriptor::new("BORROWED").with_marker(Marker::EnumValue(
            EnumValueMarker {
                deprecation_reason: Some("Use AVAILABLE with a loan record".into()),
                ..Default::default()
            },
        )))
        .with_enum_value(EnumValueDescriptor::new("DELETED").with_marker(Marker::Ignore))
}

pub fn isbn() -> TypeDescriptor {
    TypeDescriptor::new(ISBN, TypeKind::Class).with_field(
        FieldDescriptor::new("value", string()).with_marker(Marker::Id(IdMarker::default())),
    )
}

pub fn review() -> TypeDescriptor {
    TypeDescriptor::new(REVIEW, TypeKind::Class).with_field(FieldDescriptor::new("text", string()))
}

pub fn search_result() -> TypeDescriptor {
    TypeDescriptor::new(SEARCH_RESULT, TypeKind::Interface).with_marker(Marker::Union(UnionMarker {
        members: vec![BOOK.into(), AUTHOR.into(), REVIEW.into()],
        ..Default::default()
    }))
}

pub fn book_filter() -> TypeDescriptor {
    TypeDescriptor::new(BOOK_FILTER, TypeKind::Class)
        .with_marker(Marker::Input(TypeMarker::default()))
        .with_field(FieldDescriptor::new("titleContains", string()))
        .with_field(FieldDescriptor::new("status", TypeSignature::enumeration(BOOK_STATUS)))
}

pub fn create_book_input() -> TypeDescriptor {
    TypeDescriptor::new(CREATE_BOOK_INPUT, TypeKind::Class)
        .with_marker(Marker::Input(TypeMarker {
            name: Some("CreateBookInput".into()),
            ..Default::default()
        }))
        .with_field(FieldDescriptor::new("title", string()).with_marker(Marker::InputField(
            InputFieldMarker {
                required: true,
                ..Default::default()
            },
        )))
        .with_field(
            FieldDescriptor::new("pageCount", TypeSignature::class("java.lang.Integer")).with_marker(
                Marker::InputField(InputFieldMarker {
                    default_value: Some("100".into()),
                    ..Default::default()
                }),
            ),
        )
        .with_field(
            FieldDescriptor::new("status", TypeSignature::enumeration(BOOK_STATUS)).with_marker(
                Marker::InputField(InputFieldMarker {
                    default_value: Some("AVAILABLE".into()),
                    ..Default::default()
                }),
            ),
        )
        .with_field(FieldDescriptor::new("publishedOn", TypeSignature::class("java.time.LocalDate")).with_marker(
            Marker::InputField(InputFieldMarker {
                default_value: Some("not-a-date".into()),
                ..Default::default()
            }),
        ))
        .with_field(FieldDescriptor::new("authorId", TypeSignature::class("java.lang.Long")))
}

pub fn query() -> Marker {
    Marker::Query(OperationMarker::default())
}

pub fn book_controller() -> TypeDescriptor {
    let mut helper = MethodDescriptor::new("helper", string()).with_marker(query());
    helper.is_static = true;

    TypeDescriptor::new(BOOK_CONTROLLER, TypeKind::Class)
        .with_marker(Marker::Controller(ControllerMarker::default()))
        .with_method(
            MethodDescriptor::new("books", TypeSignature::list_of(TypeSignature::class(BOOK)))
                .with_marker(query())
                .with_marker(Marker::Pagination(PaginationMarker::default()))
                .with_parameter(ParameterDescriptor::new(
                    "first",
                    TypeSignature::class("java.lang.Integer"),
                ))
                .with_parameter(ParameterDescriptor::new("after", string()))
                .with_parameter(ParameterDescriptor::new(
                    "request",
                    TypeSignature::class("javax.servlet.http.HttpServletRequest"),
                )),
        )
        .with_method(
            MethodDescriptor::new("book", TypeSignature::class(BOOK))
                .with_marker(Marker::Query(OperationMarker {
                    description: Some("Find a book by id".into()),
                    ..Default::default()
                }))
                .with_parameter(ParameterDescriptor::new("id", TypeSignature::primitive("long"))),
        )
        .with_method(
            MethodDescriptor::new(
                "search",
                TypeSignature::list_of(TypeSignature::class(SEARCH_RESULT)),
            )
            .with_marker(query())
            .with_parameter(ParameterDescriptor::new("term", string()))
            .with_parameter(
                ParameterDescriptor::new("limit", TypeSignature::primitive("int")).with_marker(
                    Marker::Argument(ArgumentMarker {
                        default_value: Some("10".into()),
                        ..Default::default()
                    }),
                ),
            ),
        )
        .with_method(
            MethodDescriptor::new("archived", TypeSignature::list_of(TypeSignature::class(BOOK)))
                .with_marker(Marker::Query(OperationMarker {
                    enabled: false,
                    ..Default::default()
                })),
        )
        .with_method(helper)
        .with_method(
            MethodDescriptor::new("createBook", TypeSignature::class(BOOK))
                .with_marker(Marker::Mutation(OperationMarker {
                    roles: vec!["LIBRARIAN".into()],
                    ..Default::default()
                }))
                .with_parameter(
                    ParameterDescriptor::new("input", TypeSignature::class(CREATE_BOOK_INPUT))
                        .with_marker(Marker::Argument(ArgumentMarker {
                            required: Some(true),
                            ..Default::default()
                        })),
                ),
        )
        .with_method(
            MethodDescriptor::new("deleteBook", TypeSignature::void())
                .with_marker(Marker::Mutation(OperationMarker::default()))
                .with_parameter(ParameterDescriptor::new("id", TypeSignature::primitive("long"))),
        )
        .with_method(
            MethodDescriptor::new(
                "bookAdded",
                TypeSignature::stream_of("reactor.core.publisher.Flux", TypeSignature::class(BOOK)),
            )
            .with_marker(Marker::Subscription(OperationMarker::default()))
            .with_parameter(
                ParameterDescriptor::new("status", TypeSignature::enumeration(BOOK_STATUS))
                    .with_marker(Marker::SubscriptionFilter(SubscriptionFilterMarker {
                        optional: true,
                        ..Default::default()
                    })),
            ),
        )
}

pub fn author_controller() -> TypeDescriptor {
    TypeDescriptor::new(AUTHOR_CONTROLLER, TypeKind::Class)
        .with_marker(Marker::Controller(ControllerMarker {
            prefix: Some("author".into()),
            ..Default::default()
        }))
        .with_method(
            MethodDescriptor::new("list", TypeSignature::list_of(TypeSignature::class(AUTHOR)))
                .with_marker(query()),
        )
        .with_method(
            MethodDescriptor::new("get", TypeSignature::class(AUTHOR))
                .with_marker(Marker::Query(OperationMarker {
                    name: Some("author".into()),
                    ..Default::default()
                }))
                .with_parameter(ParameterDescriptor::new("id", TypeSignature::class("java.lang.Long"))),
        )
}

/// The whole library domain
pub fn library() -> DescriptorSet {
    DescriptorSet::new(vec![
        auditable(),
        entity(),
        book(),
        author(),
        book_status(),
        isbn(),
        review(),
        search_result(),
        book_filter(),
        create_book_input(),
        book_controller(),
        author_controller(),
    ])
}
