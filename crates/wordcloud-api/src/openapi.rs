use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::routes::process::handler),
    components(schemas(crate::routes::process::ProcessRequest)),
    tags(
        (name = "wordcloud", description = "Mask-shaped word cloud rendering")
    )
)]
struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
