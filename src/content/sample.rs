// src/content/sample.rs
//! Built-in content served when every upstream is down.

use crate::content::article::COLUMNS;
use crate::content::podcast::Episode;
use crate::content::types::SheetValues;

const SAMPLE_ROWS: &[[&str; 13]] = &[
    [
        "2024-01-20",
        "B2",
        "Job Interview",
        "Published",
        "Ich hatte gestern ein wichtiges Vorstellungsgespräch bei einer großen Firma. Der Personaler stellte mir viele Fragen über meine Berufserfahrung. Ich war nervös, aber ich konnte alle Fragen gut beantworten.",
        "I had an important job interview at a large company yesterday. The HR manager asked me many questions about my work experience. I was nervous, but I could answer all questions well.",
        "das Vorstellungsgespräch - job interview, der Personaler - HR manager, die Berufserfahrung - work experience, nervös - nervous",
        "Präteritum (hatte, stellte, war) is used for past events. Modal verb \"konnte\" shows past ability.",
        "Daumen drücken - to keep fingers crossed",
        "Erfolg ist kein Zufall - Success is no coincidence",
        "A: Wie war dein Vorstellungsgespräch? B: Es lief sehr gut, danke!",
        "Präteritum,Modalverben",
        "Gestern {ging} ich ins Kino. Ich {hatte} keine Zeit. Er {konnte} nicht kommen.",
    ],
    [
        "2024-01-19",
        "A2-B1",
        "Shopping",
        "Published",
        "Heute gehe ich einkaufen. Ich brauche Milch, Brot und Käse. Der Supermarkt ist nicht weit von meiner Wohnung. Ich gehe immer zu Fuß dorthin.",
        "Today I am going shopping. I need milk, bread, and cheese. The supermarket is not far from my apartment. I always walk there.",
        "einkaufen - to shop, die Milch - milk, das Brot - bread, der Käse - cheese, zu Fuß - on foot",
        "Present tense for habitual actions. Accusative case after \"brauche\" (Ich brauche Milch).",
        "Das ist mir Wurst - I don't care (literally: that's sausage to me)",
        "Wer billig kauft, kauft zweimal - Buy cheap, buy twice",
        "Verkäufer: Was darf es sein? Kunde: Ich hätte gern 200g Käse.",
        "Präsens,Akkusativ",
        "Ich {brauche} einen Stift. Er {geht} zur Schule. Wir {kaufen} Brot.",
    ],
    [
        "2024-01-18",
        "C1+",
        "Climate Change",
        "Published",
        "Der Klimawandel stellt eine der größten Herausforderungen unserer Zeit dar. Wissenschaftler warnen vor den katastrophalen Folgen, falls wir nicht sofort handeln. Die Politik müsste dringend effektivere Maßnahmen ergreifen.",
        "Climate change represents one of the greatest challenges of our time. Scientists warn of catastrophic consequences if we don't act immediately. Politics urgently needs to take more effective measures.",
        "der Klimawandel - climate change, die Herausforderung - challenge, warnen - to warn, die Folgen - consequences, Maßnahmen ergreifen - to take measures",
        "Konjunktiv II (müsste) expresses necessity/urgency. Conditional clause with \"falls\". Comparative form \"effektivere\".",
        "Den Kopf in den Sand stecken - to bury one's head in the sand",
        "Die Zukunft hängt davon ab, was wir heute tun - The future depends on what we do today",
        "A: Was sollten wir gegen den Klimawandel tun? B: Jeder muss bei sich selbst anfangen.",
        "Konjunktiv II,Komparativ,Konditional",
        "Wenn ich reich {wäre}, {würde} ich reisen. Er {müsste} mehr lernen.",
    ],
    [
        "2024-01-17",
        "B2",
        "Technology & AI",
        "Published",
        "Künstliche Intelligenz wird immer wichtiger in unserem Alltag. Viele Menschen haben Angst, dass Roboter ihre Arbeitsplätze übernehmen könnten. Experten meinen jedoch, dass KI neue Möglichkeiten schaffen wird.",
        "Artificial intelligence is becoming increasingly important in our daily life. Many people fear that robots could take over their jobs. However, experts believe that AI will create new opportunities.",
        "künstliche Intelligenz - artificial intelligence, der Alltag - daily life, übernehmen - to take over, die Möglichkeit - opportunity, schaffen - to create",
        "Future tense with \"werden\". Modal verb \"könnten\" (Konjunktiv II) for possibility. Subordinate clause with \"dass\".",
        "Auf dem neuesten Stand sein - to be up to date",
        "Die Maschine kann den Menschen nicht ersetzen - The machine cannot replace humans",
        "A: Hast du ChatGPT schon ausprobiert? B: Ja, es ist beeindruckend!",
        "Futur,Konjunktiv II,Nebensätze",
        "KI {wird} die Welt verändern. Roboter {könnten} Jobs übernehmen.",
    ],
    [
        "2024-01-16",
        "A2-B1",
        "Family Weekend",
        "Published",
        "Am Wochenende besuche ich meine Eltern. Meine Mutter kocht immer mein Lieblingsessen. Nach dem Mittagessen spielen wir Karten oder gehen spazieren. Es ist schön, Zeit mit der Familie zu verbringen.",
        "On the weekend I visit my parents. My mother always cooks my favorite food. After lunch we play cards or go for a walk. It's nice to spend time with family.",
        "das Wochenende - weekend, die Eltern - parents, das Lieblingsessen - favorite food, Karten spielen - to play cards, spazieren gehen - to go for a walk",
        "Present tense for regular activities. Infinitive constructions with \"zu\" (Zeit zu verbringen).",
        "Blut ist dicker als Wasser - Blood is thicker than water",
        "Familie ist nicht wichtig, sie ist alles - Family is not important, it is everything",
        "Kind: Was machen wir heute? Mutter: Wir backen einen Kuchen zusammen!",
        "Präsens,Infinitiv mit zu",
        "Es ist schön, hier {zu sein}. Ich habe Zeit, {zu lesen}.",
    ],
];

/// Header row plus five published articles, in sheet layout.
pub fn sample_sheet_values() -> SheetValues {
    let mut out = Vec::with_capacity(SAMPLE_ROWS.len() + 1);
    out.push(COLUMNS.iter().map(|c| c.to_string()).collect());
    for row in SAMPLE_ROWS {
        out.push(row.iter().map(|c| c.to_string()).collect());
    }
    out
}

/// Two short episodes in upstream shape, without learning metadata.
pub fn sample_episodes() -> Vec<Episode> {
    vec![
        Episode::new(
            "sample-ai-tech",
            "ai-tech",
            "de",
            "Künstliche Intelligenz im Alltag",
            "Künstliche Intelligenz wird unseren Alltag verändern. Viele Firmen haben schon Assistenten eingeführt, \
             und wenn die Technik besser wird, kann sie noch mehr Aufgaben übernehmen.",
            "4:30",
        ),
        Episode::new(
            "sample-sunday-specials",
            "sunday-specials",
            "de",
            "Ein Sonntag in Berlin",
            "Am Sonntag habe ich einen langen Spaziergang gemacht. Das Wetter war schön, obwohl es am Morgen \
             geregnet hatte. Danach muss ich noch Kuchen kaufen.",
            "3:10",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::article::parse_articles;

    #[test]
    fn sample_sheet_parses_to_five_articles() {
        let values = sample_sheet_values();
        assert_eq!(values[0].len(), 13);
        assert!(values.iter().skip(1).all(|r| r.len() == 13));
        assert_eq!(parse_articles(&values).len(), 5);
    }

    #[test]
    fn sample_episodes_carry_a_script() {
        let eps = sample_episodes();
        assert_eq!(eps.len(), 2);
        assert!(eps.iter().all(|e| e.script.as_deref().is_some_and(|s| !s.is_empty())));
    }
}
