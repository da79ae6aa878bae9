use anyhow::Result;
use rand::distributions::Alphanumeric;
use rand::Rng;
use recipe_assistant::models::{RecipeCreate, RecipeUpdate};
use recipe_assistant::repositories::{
    DocumentRecipeRepository, InMemoryRecipeRepository, LocalCollection, RecipeRepository,
};
use std::env;
use uuid::Uuid;

const TEST_MONGODB_URI_ENV_VAR: &str = "RECIPES_MONGODB_URI";

fn sample_recipe_payload() -> RecipeCreate {
    RecipeCreate {
        title: "Spicy Tomato Pasta".to_string(),
        description: None,
        ingredients: vec!["pasta".into(), "tomatoes".into(), "garlic".into()],
        steps: vec![
            "Boil pasta".into(),
            "Simmer sauce".into(),
            "Combine everything".into(),
        ],
        tags: vec!["pasta".into(), "quick".into()],
    }
}

fn random_word(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(1..=12);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn random_words(rng: &mut impl Rng, min: usize) -> Vec<String> {
    let count = rng.gen_range(min..=5);
    (0..count).map(|_| random_word(rng)).collect()
}

fn random_payloads(count: usize) -> Vec<RecipeCreate> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| RecipeCreate {
            title: random_word(&mut rng),
            description: if rng.gen_bool(0.5) {
                Some(random_word(&mut rng))
            } else {
                None
            },
            ingredients: random_words(&mut rng, 1),
            steps: random_words(&mut rng, 1),
            tags: random_words(&mut rng, 0),
        })
        .collect()
}

async fn check_round_trip(repo: &dyn RecipeRepository) -> Result<()> {
    for payload in random_payloads(25) {
        let created = repo.create_recipe(payload.clone()).await?;
        assert_eq!(created.title, payload.title);
        assert_eq!(created.description, payload.description);
        assert_eq!(created.ingredients, payload.ingredients);
        assert_eq!(created.steps, payload.steps);
        assert_eq!(created.tags, payload.tags);

        let fetched = repo.get_recipe(created.id).await?;
        assert_eq!(fetched, Some(created));
    }
    assert_eq!(repo.list_recipes().await?.len(), 25);
    Ok(())
}

async fn check_partial_update(repo: &dyn RecipeRepository) -> Result<()> {
    let created = repo.create_recipe(sample_recipe_payload()).await?;

    let update = RecipeUpdate {
        tags: Some(vec!["comfort".into()]),
        ..Default::default()
    };
    let updated = repo
        .update_recipe(created.id, update)
        .await?
        .expect("recipe should exist");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.tags, vec!["comfort"]);
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.ingredients, created.ingredients);
    assert_eq!(updated.steps, created.steps);

    let update = RecipeUpdate {
        description: Some("Now with chili.".into()),
        steps: Some(vec!["Do it all at once".into()]),
        ..Default::default()
    };
    let updated = repo
        .update_recipe(created.id, update)
        .await?
        .expect("recipe should exist");
    assert_eq!(updated.description.as_deref(), Some("Now with chili."));
    assert_eq!(updated.steps, vec!["Do it all at once"]);
    assert_eq!(updated.tags, vec!["comfort"]);
    assert_eq!(repo.get_recipe(created.id).await?, Some(updated));

    let missing = repo
        .update_recipe(
            Uuid::new_v4(),
            RecipeUpdate {
                title: Some("ghost".into()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(missing, None);
    Ok(())
}

async fn check_delete_is_terminal(repo: &dyn RecipeRepository) -> Result<()> {
    let created = repo.create_recipe(sample_recipe_payload()).await?;
    assert!(repo.delete_recipe(created.id).await?);
    assert_eq!(repo.get_recipe(created.id).await?, None);
    assert!(!repo.delete_recipe(created.id).await?);
    Ok(())
}

async fn check_unknown_id_is_absent(repo: &dyn RecipeRepository) -> Result<()> {
    assert_eq!(repo.get_recipe(Uuid::new_v4()).await?, None);
    assert!(!repo.delete_recipe(Uuid::new_v4()).await?);
    Ok(())
}

async fn check_contract(repo: &dyn RecipeRepository) -> Result<()> {
    check_unknown_id_is_absent(repo).await?;
    check_partial_update(repo).await?;
    check_delete_is_terminal(repo).await?;
    Ok(())
}

#[tokio::test]
async fn test_in_memory_contract() -> Result<()> {
    check_contract(&InMemoryRecipeRepository::new()).await?;
    check_round_trip(&InMemoryRecipeRepository::new()).await
}

#[tokio::test]
async fn test_document_backend_contract() -> Result<()> {
    check_contract(&DocumentRecipeRepository::new(LocalCollection::new())).await?;
    check_round_trip(&DocumentRecipeRepository::new(LocalCollection::new())).await
}

#[tokio::test]
async fn test_create_scenario_generates_id() -> Result<()> {
    let repo = InMemoryRecipeRepository::new();
    let created = repo.create_recipe(sample_recipe_payload()).await?;
    assert_eq!(created.title, "Spicy Tomato Pasta");
    assert_ne!(created.id, Uuid::nil());

    let other = repo.create_recipe(sample_recipe_payload()).await?;
    assert_ne!(created.id, other.id);
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_mongo_backend_contract() -> Result<()> {
    let Ok(uri) = env::var(TEST_MONGODB_URI_ENV_VAR) else {
        println!(
            "Skipping test_mongo_backend_contract: {} not set.",
            TEST_MONGODB_URI_ENV_VAR
        );
        return Ok(());
    };

    let client = mongodb::Client::with_uri_str(&uri).await?;
    let collection_name = format!("recipes_test_{}", Uuid::new_v4().simple());
    let repo = DocumentRecipeRepository::mongo(&client, "recipes_test", &collection_name)?;

    let result = async {
        check_contract(&repo).await?;
        check_round_trip(&repo).await
    }
    .await;

    client
        .database("recipes_test")
        .collection::<mongodb::bson::Document>(&collection_name)
        .drop()
        .await?;
    client.shutdown().await;
    result
}
