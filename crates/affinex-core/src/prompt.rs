//! Fixed instructional template for affinity-field extraction.

/// System instruction sent with every extraction request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant specializing in data extraction from scientific literature.";

/// Build the extraction prompt around cleaned literature text.
///
/// Pure interpolation. Tab and newline characters inside `clean_text` are
/// passed through untouched, as is any tab or newline the model returns —
/// the TSV writer does not escape field contents either.
pub fn build_prompt(clean_text: &str) -> String {
    format!(
        r#"You are an expert in extracting data from scientific literature. Your task is to extract all the "Ligand name", "Receptor protein name", "Receptor protein organism source", "Affinity value", "Wet lab method for affinity measurement" and "corresponding complex PDBID" from the converted scientific literature text.

Special attention:
- Please note that the data is extracted directly from the literature; please do not infer or tamper with the data.

Output requirements:
- The output must be in TSV format, and each line can only be one wet test measurement of affinity.
- There are exactly 6 columns in this order.

- Columns:
1. Ligand name (extract peptide ligand name from converted scientific literature text.)
2. Receptor protein name (extract the protein name from the converted text format.)
3. Receptor protein organism source (such as "Homo sapiens"; "Mus musculus"; "Rattus norvegicus"; "Hepatitis C virus", etc.)
4. Affinity value (for example: "Kd=1.2 nM"; "Ki=2.3 pM"; "IC50=11 uM"; "Ki=1.13 uM"; must follow the example format.)
5. Wet lab method for affinity measurement (for example: "isothermal titration calorimetry"; "surface plasmon resonance"; "fluorescence polarization"; "biomembrane interference method"; "ELISA"; "enzyme activity assay"; etc.)
6. Corresponding complex PDBID
Cleaned text for extraction:
{clean_text}"#
    )
}
