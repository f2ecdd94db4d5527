use chef_digital::store::RecipeRepository;
use chef_digital::testing::{MemoryRecipeStore, StaticOcr, StaticProvider, StaticTranscripts};
use chef_digital::{
    AppConfig, Chef, ChefError, ExtractInput, IngredientCategory, NewRecipe, RecipeUpdate,
    UpdateInput,
};
use std::sync::Arc;

const LASAGNA_REPLY: &str = "Title: Lasagna
Source: None
Ingredients:
- Sauce:
  - 500 g ground beef
  - 2 cloves garlic
- Assembly:
  - 12 lasagna sheets
  - 250 g ricotta
Instructions:
1. Brown the beef with the garlic.
2. Layer sheets, sauce and ricotta.
3. Bake for 45 minutes.
";

struct Fixture {
    chef: Chef,
    store: Arc<MemoryRecipeStore>,
    provider: Arc<StaticProvider>,
    ocr: Arc<StaticOcr>,
}

async fn fixture(reply: &str, ocr_text: &str, transcript: Option<&str>) -> Fixture {
    let store = Arc::new(MemoryRecipeStore::default());
    let provider = Arc::new(StaticProvider::new(reply));
    let ocr = Arc::new(StaticOcr::new(ocr_text));

    let chef = Chef::builder()
        .config(AppConfig::default())
        .with_llm(provider.clone())
        .with_store(store.clone())
        .with_ocr(ocr.clone())
        .with_transcripts(Arc::new(StaticTranscripts::new(transcript)))
        .build()
        .await
        .unwrap();

    Fixture {
        chef,
        store,
        provider,
        ocr,
    }
}

#[tokio::test]
async fn test_add_text_normalizes_exactly() {
    let f = fixture(LASAGNA_REPLY, "", None).await;

    let recipe = f
        .chef
        .ingest_add(ExtractInput::text("  my nonna's lasagna, beef, garlic...  "))
        .await
        .unwrap();

    assert_eq!(recipe.title, "Lasagna");
    assert_eq!(recipe.source_url, None);
    assert_eq!(
        recipe.ingredients,
        vec![
            IngredientCategory::new(
                "Sauce",
                vec!["500 g ground beef".to_string(), "2 cloves garlic".to_string()]
            ),
            IngredientCategory::new(
                "Assembly",
                vec!["12 lasagna sheets".to_string(), "250 g ricotta".to_string()]
            ),
        ]
    );
    assert_eq!(
        recipe.instructions,
        vec![
            "Brown the beef with the garlic.",
            "Layer sheets, sauce and ricotta.",
            "Bake for 45 minutes.",
        ]
    );

    // The model saw the trimmed text, not the raw submission
    let prompts = f.provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("my nonna's lasagna, beef, garlic..."));
    assert!(!prompts[0].contains("  my nonna's"));
    assert_eq!(f.store.len(), 1);
}

#[tokio::test]
async fn test_blank_text_never_reaches_model_or_store() {
    let f = fixture(LASAGNA_REPLY, "", None).await;

    let err = f
        .chef
        .ingest_add(ExtractInput::text(" \n\t "))
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::EmptyInput));
    assert!(f.provider.prompts().is_empty());
    assert_eq!(f.store.create_calls(), 0);
}

#[tokio::test]
async fn test_blank_ocr_is_extraction_error() {
    let f = fixture(LASAGNA_REPLY, "   ", None).await;

    let err = f
        .chef
        .ingest_add(ExtractInput::image(b"\x89PNG".to_vec()))
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::Extraction(_)));
    assert_eq!(f.ocr.calls(), 1);
    assert!(f.provider.prompts().is_empty());
    assert_eq!(f.store.create_calls(), 0);
}

#[tokio::test]
async fn test_missing_instructions_writes_nothing() {
    let reply = "Title: Lasagna
Source: None
Ingredients:
- Sauce:
  - 500 g ground beef
";
    let f = fixture(reply, "", None).await;

    let err = f
        .chef
        .ingest_add(ExtractInput::text("lasagna"))
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::MalformedResponse(_)));
    assert_eq!(f.store.create_calls(), 0);
    assert!(f.store.is_empty());
}

#[tokio::test]
async fn test_image_add_uses_ocr_text() {
    let f = fixture(LASAGNA_REPLY, "Lasagna\nbeef, garlic, sheets", None).await;

    let recipe = f
        .chef
        .ingest_add(ExtractInput::image(b"jpeg bytes".to_vec()))
        .await
        .unwrap();

    assert_eq!(recipe.title, "Lasagna");
    assert!(f.provider.prompts()[0].contains("Lasagna\nbeef, garlic, sheets"));
}

#[tokio::test]
async fn test_video_add_keeps_video_url_as_source() {
    let f = fixture(LASAGNA_REPLY, "", Some("today we make lasagna")).await;

    let recipe = f
        .chef
        .ingest_add(ExtractInput::video("https://www.youtube.com/watch?v=dQw4w9WgXcQ"))
        .await
        .unwrap();

    assert_eq!(
        recipe.source_url.as_deref(),
        Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    );
}

#[tokio::test]
async fn test_unsupported_video_source() {
    let f = fixture(LASAGNA_REPLY, "", Some("unused")).await;

    let err = f
        .chef
        .ingest_add(ExtractInput::video("https://vimeo.com/76979871"))
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::UnsupportedSource(_)));
    assert_eq!(f.store.create_calls(), 0);
}

#[tokio::test]
async fn test_second_add_with_same_title_is_duplicate() {
    let f = fixture(LASAGNA_REPLY, "", None).await;

    f.chef
        .ingest_add(ExtractInput::text("first lasagna"))
        .await
        .unwrap();
    let err = f
        .chef
        .ingest_add(ExtractInput::text("another lasagna"))
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::DuplicateTitle(title) if title == "Lasagna"));
    assert_eq!(f.store.len(), 1);
}

#[tokio::test]
async fn test_update_fields_skips_model() {
    let f = fixture(LASAGNA_REPLY, "", None).await;
    let created = f
        .chef
        .ingest_add(ExtractInput::text("lasagna"))
        .await
        .unwrap();

    let updated = f
        .chef
        .ingest_update(
            &created.id,
            UpdateInput::Fields(RecipeUpdate {
                title: Some("Weeknight Lasagna".to_string()),
                source_url: Some(Some("https://example.com/lasagna".to_string())),
                ..RecipeUpdate::default()
            }),
        )
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Weeknight Lasagna");
    assert_eq!(updated.ingredients, created.ingredients);
    assert_eq!(f.provider.prompts().len(), 1);
}

#[tokio::test]
async fn test_update_fields_rejects_blank_title() {
    let f = fixture(LASAGNA_REPLY, "", None).await;
    let created = f
        .chef
        .ingest_add(ExtractInput::text("lasagna"))
        .await
        .unwrap();

    let err = f
        .chef
        .ingest_update(
            &created.id,
            UpdateInput::Fields(RecipeUpdate {
                title: Some("   ".to_string()),
                ..RecipeUpdate::default()
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::Validation(_)));
    assert_eq!(f.chef.get(&created.id).await.unwrap().title, "Lasagna");
}

#[tokio::test]
async fn test_resubmit_replaces_every_field() {
    let f = fixture(LASAGNA_REPLY, "", None).await;
    let draft = f
        .chef
        .store()
        .create(NewRecipe {
            title: "Lasagna Draft".to_string(),
            source_url: Some("https://example.com/draft".to_string()),
            ingredients: vec![IngredientCategory::new("Ingredients", vec!["pasta".to_string()])],
            instructions: vec!["Cook.".to_string()],
        })
        .await
        .unwrap();

    let updated = f
        .chef
        .ingest_update(
            &draft.id,
            UpdateInput::Resubmit(ExtractInput::text("the real lasagna recipe")),
        )
        .await
        .unwrap();

    assert_eq!(updated.id, draft.id);
    assert_eq!(updated.title, "Lasagna");
    assert_eq!(updated.source_url, None);
    assert_eq!(updated.ingredients.len(), 2);
    assert_eq!(updated.instructions.len(), 3);
    assert_eq!(f.store.len(), 1);
}

#[tokio::test]
async fn test_resubmit_missing_recipe_calls_nothing() {
    let f = fixture(LASAGNA_REPLY, "text", None).await;

    let err = f
        .chef
        .ingest_update(
            "no-such-id",
            UpdateInput::Resubmit(ExtractInput::image(b"jpeg".to_vec())),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::NotFound(_)));
    assert_eq!(f.ocr.calls(), 0);
    assert!(f.provider.prompts().is_empty());
}

#[tokio::test]
async fn test_update_missing_recipe_fields() {
    let f = fixture(LASAGNA_REPLY, "", None).await;

    let err = f
        .chef
        .ingest_update(
            "no-such-id",
            UpdateInput::Fields(RecipeUpdate {
                title: Some("Soup".to_string()),
                ..RecipeUpdate::default()
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::NotFound(_)));
}

#[tokio::test]
async fn test_provider_failure_is_surfaced() {
    let store = Arc::new(MemoryRecipeStore::default());
    let chef = Chef::builder()
        .config(AppConfig::default())
        .with_llm(Arc::new(StaticProvider::failing("503 overloaded")))
        .with_store(store.clone())
        .build()
        .await
        .unwrap();

    let err = chef
        .ingest_add(ExtractInput::text("lasagna"))
        .await
        .unwrap_err();

    assert!(matches!(err, ChefError::Provider(msg) if msg == "503 overloaded"));
    assert_eq!(store.create_calls(), 0);
}
