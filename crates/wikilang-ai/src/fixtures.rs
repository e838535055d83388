//! Small bilingual corpus shared by the unit tests.

use wikilang_core::LanguageCatalog;
use wikilang_store::{CorpusStore, DirStore};

use crate::bundle::ModelBundle;
use crate::labels::LabelEncoder;

pub const ENGLISH: &str = "The city is located on the northern bank of the river and \
    has been an important trading centre since the Middle Ages. It was the capital of \
    the province until the government moved to the coast in the nineteenth century. \
    The old town is known for its narrow streets, its cathedral and the market square \
    where merchants have sold wool and grain for hundreds of years. Today the economy \
    depends on tourism, light industry and the university, which was founded in the \
    sixteenth century and is one of the oldest in the country. The climate is mild \
    with warm summers and wet winters, and the surrounding hills are covered with \
    forests and farms. Several railway lines meet at the central station, and a new \
    bridge across the river was opened in the last decade.";

pub const FRENCH: &str = "La ville est située sur la rive nord du fleuve et elle est \
    un centre de commerce important depuis le Moyen Âge. Elle était la capitale de la \
    province jusqu'au moment où le gouvernement s'est installé sur la côte au dix-neuvième \
    siècle. La vieille ville est connue pour ses rues étroites, sa cathédrale et la place \
    du marché où les marchands vendent de la laine et du grain depuis des siècles. \
    Aujourd'hui le commerce ne dépend pas seulement du tourisme, mais aussi de \
    l'industrie légère et de l'université, qui a été fondée au seizième siècle et qui \
    est une des plus anciennes du pays. Le climat est doux avec des étés chauds et des \
    hivers humides, et les collines sont couvertes de forêts et de fermes. Plusieurs \
    lignes de chemin de fer se croisent à la gare centrale, et un nouveau pont a été \
    ouvert sur le fleuve pendant la dernière décennie.";

pub const ENGLISH_HELD_OUT: &str = "The river was an important route for merchants and \
    the market of the old town sold grain and wool to the province and the coast for \
    hundreds of years since the city was founded";

pub const FRENCH_HELD_OUT: &str = "Le fleuve est une route de commerce pour les marchands \
    et la place du marché de la vieille ville vend de la laine et du grain depuis des \
    siècles sur la rive nord de la province";

pub fn en_fr_catalog() -> LanguageCatalog {
    LanguageCatalog::default()
        .subset(&["en", "fr"])
        .expect("en and fr are in the default catalog")
}

pub fn en_fr_labels() -> LabelEncoder {
    LabelEncoder::from_catalog(&en_fr_catalog())
}

pub fn en_fr_bundle() -> ModelBundle {
    ModelBundle::fit(en_fr_labels(), &[ENGLISH, FRENCH], &[0, 1]).expect("fixture bundle fits")
}

/// A directory corpus holding both languages, training and held-out text.
pub fn en_fr_corpus(root: &std::path::Path) -> DirStore {
    let store = DirStore::open(root).expect("open fixture corpus");
    store
        .write_partition("en", ENGLISH, ENGLISH_HELD_OUT)
        .expect("write en");
    store
        .write_partition("fr", FRENCH, FRENCH_HELD_OUT)
        .expect("write fr");
    store
}
