// tests/articles_parse.rs
//
// Sheet payloads from each source format down to published articles.

use std::sync::Arc;

use chrono::NaiveDate;
use deutsch_daily::content::article::{parse_articles, COLUMNS};
use deutsch_daily::content::library::ArticleLibrary;
use deutsch_daily::content::sources::csv_export::parse_csv;
use deutsch_daily::content::sources::gviz::parse_gviz;
use deutsch_daily::content::sources::StaticSource;
use deutsch_daily::content::SheetChain;

const GVIZ_BODY: &str = r#"/*O_o*/
google.visualization.Query.setResponse({"version":"0.6","reqId":"0","status":"ok","table":{
"cols":[{"label":"DATE"},{"label":"LEVEL"},{"label":"THEME"},{"label":"STATUS"},{"label":"GERMAN_ARTICLE"},{"label":"ENGLISH_TRANSLATION"},{"label":"VOCABULARY_USED"}],
"rows":[
 {"c":[{"v":"Date(2024,1,3)","f":"03.02.2024"},{"v":"B2"},{"v":"Reisen"},{"v":"Published"},{"v":"Wir fahren nach Wien."},{"v":"We travel to Vienna."},{"v":"die Reise - trip, fahren - to drive"}]},
 {"c":[{"v":"2024-02-02"},{"v":"B2"},{"v":"Entwurf"},{"v":"Draft"},{"v":"..."},{"v":"..."},null]},
 {"c":[{"v":"2024-02-01"},{"v":"C1+"},{"v":"Politik"},{"v":"Published"},null,{"v":"Politics"},null]}
]}});"#;

#[test]
fn gviz_payload_to_articles() {
    let values = parse_gviz(GVIZ_BODY).expect("gviz parses");
    let lib = ArticleLibrary::from_values(&values);

    // Draft is skipped, the Politik row lacks its German text.
    assert_eq!(lib.len(), 1);
    let a = &lib.all()[0];
    assert_eq!(a.date, "2024-02-03");
    assert_eq!(a.vocabulary.len(), 2);
    assert_eq!(a.vocabulary[1].term, "fahren");
    assert!(a.drills.is_empty());
}

#[test]
fn csv_payload_to_articles() {
    let mut body = COLUMNS.map(|c| format!("\"{c}\"")).join(",");
    body.push_str("\r\n");
    body.push_str(
        "\"2024-02-10\",\"A2-B1\",\"Essen\",\"Published\",\"Ich esse gern Brot, Käse und Obst.\",\
         \"I like eating bread, cheese and fruit.\",\"das Brot - bread\",\"\",\"\",\"\",\"\",\
         \"Präsens, Akkusativ\",\"Ich {esse} Brot. Er {trinkt} Tee.\"\r\n",
    );

    let arts = parse_articles(&parse_csv(&body));
    assert_eq!(arts.len(), 1);
    let a = &arts[0];
    assert_eq!(a.german, "Ich esse gern Brot, Käse und Obst.");
    assert_eq!(a.grammar_tags, vec!["Präsens", "Akkusativ"]);
    assert_eq!(a.drills.len(), 2);
    assert_eq!(a.drills[1].prompt, "Er ___ Tee.");
    assert_eq!(a.drills[1].answers, vec!["trinkt"]);
}

#[tokio::test]
async fn offline_chain_still_yields_a_library() {
    let chain = SheetChain::new(vec![
        Arc::new(StaticSource::failing("sheets-api")),
        Arc::new(StaticSource::failing("gviz")),
    ]);
    let fetched = chain.fetch().await;
    assert!(fetched.fallback);

    let lib = ArticleLibrary::from_values(&fetched.values);
    assert_eq!(lib.len(), 5);
    let today = lib
        .today_or_first(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap())
        .unwrap();
    assert_eq!(today.theme, "Family Weekend");
    assert_eq!(today.drills[0].answers, vec!["zu sein"]);
}
