//! Common test helpers and fixtures shared across the test suite.

#![allow(dead_code)]

use sami2marc::{Field, Leader, Record};

/// Authority header line with all nine attributes.
pub const AUTHORITY_HEADER: &str =
    "SID001\t\tBK\t\tm\t\tNEVER\t\tjsmith\t\t01/01/2020\t\tjbrown\t\tcataloged\t\tLOADER";

/// Two authority records as found in a delimited dump.
pub fn authority_export() -> String {
    format!(
        "$$ AUTHORITY EXPORT\n\
         .begin\n\
         {AUTHORITY_HEADER}\n   \
         100:   |1 |aSmith, John,|d1900-1980\n   \
         670:   |aHis Life and works,\n        1975\n\
         .end\n\
         \n\
         SID002\t\tBK\t\tm\t\t02/03/1999\t\tadmin\t\tNEVER\t\tadmin\t\tcataloged\t\tLOADER\n   \
         001:   |aAUTH0002\n   \
         150:   |aCats\n\
         .end\n"
    )
}

/// Three records in the plain tagged text dialect.
pub const TEXT_EXPORT: &str = "*** DOCUMENT BOUNDARY ***\n\
FORM=MARC\n\
.000. |aam a2200000 a 4500\n\
.001. |aCKEY1001\n\
.008. |a200101s2020    enk           000 0 eng d\n\
.245. 10|aThe first title /|cFirst Author.\n\
.650.  0|aCats|vJuvenile fiction.\n\
*** DOCUMENT BOUNDARY ***\n\
FORM=MARC\n\
.001. |aCKEY1002\n\
.100. 1 |aSecond, Author.\n\
.245. 14|aThe second title.\n\
*** DOCUMENT BOUNDARY ***\n\
FORM=SERIAL\n\
.001. |aCKEY1003\n\
.245. 00|aThird & last <title>.\n";

/// One PRN report record with two holdings items.
pub const PRN_EXPORT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<report>\n\
<title>Catalog report</title>\n\
<dateFormat>YYYY-MM-DD</dateFormat>\n\
<catalog>\n\
<marcEntry tag=\"001\" label=\"Control number\" ind=\"  \">|aCKEY2001</marcEntry>\n\
<marcEntry tag=\"245\" label=\"Title\" ind=\"10\">|aReport title|cReport author</marcEntry>\n\
<call>\n\
<callNumber>QA76.73 .R87</callNumber>\n\
<library>MAIN</library>\n\
<item>\n\
<copyNumber>1</copyNumber>\n\
<itemID>390010001</itemID>\n\
<dateCreated>2020-01-01</dateCreated>\n\
<homeLocation>STACKS</homeLocation>\n\
<type>BOOK</type>\n\
</item>\n\
<item>\n\
<itemID>390010002</itemID>\n\
<dateModified>2021-06-30</dateModified>\n\
</item>\n\
</call>\n\
</catalog>\n\
<catalog>\n\
<marcEntry tag=\"001\" label=\"Control number\" ind=\"  \">|aCKEY2002</marcEntry>\n\
</catalog>\n\
</report>\n";

/// Two XML-tagged records wrapped in an OAI-PMH response.
pub const XML_EXPORT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<OAI-PMH xmlns=\"http://www.openarchives.org/OAI/2.0/\">\n\
<ListRecords>\n\
<record xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n\
<header><identifier>oai:lib:3001</identifier></header>\n\
<metadata><marc:record>\n\
<marc:controlfield tag=\"001\">CKEY3001</marc:controlfield>\n\
<marc:datafield tag=\"245\" ind1=\"1\" ind2=\"0\"><marc:subfield code=\"a\">Fish &amp; chips</marc:subfield></marc:datafield>\n\
</marc:record></metadata>\n\
</record>\n\
<record xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\n\
<header><identifier>oai:lib:3002</identifier></header>\n\
<metadata><marc:record>\n\
<marc:datafield tag=\"245\" ind1=\"0\" ind2=\"0\"><marc:subfield code=\"a\">No control number</marc:subfield></marc:datafield>\n\
</marc:record></metadata>\n\
</record>\n\
</ListRecords>\n\
</OAI-PMH>\n";

/// Two deletion markers from an XML deletion export.
pub const XML_DELETIONS: &str = "<record>\n\
<header status=\"deleted\">\n\
<identifier>3005</identifier>\n\
<datestamp>2020-05-01</datestamp>\n\
</header>\n\
</record>\n\
<record>\n\
<header status=\"deleted\">\n\
<identifier>3006</identifier>\n\
</header>\n\
</record>\n";

/// Creates a leader for test records.
pub fn create_test_leader() -> Leader {
    Leader::parse("00000nam a2200000 i 4500").unwrap()
}

/// Creates a small bibliographic record.
pub fn create_test_record() -> Record {
    let mut record = Record::new(create_test_leader());
    record.add_ordered_field(Field::control("001", "CKEY12345").unwrap());
    record.add_ordered_field(Field::control("008", "200101s2020    enk").unwrap());
    record.add_ordered_field(
        Field::builder("245", '1', '0')
            .unwrap()
            .subfield('a', "The Great Gatsby /")
            .subfield('c', "F. Scott Fitzgerald.")
            .build(),
    );
    record.add_ordered_field(
        Field::builder("100", '1', ' ')
            .unwrap()
            .subfield('a', "Fitzgerald, F. Scott,")
            .subfield('d', "1896-1940.")
            .build(),
    );
    record
}

/// Tags of a record in stored order.
pub fn tags(record: &Record) -> Vec<&str> {
    record.fields().iter().map(Field::tag).collect()
}
