//! The fixed system instruction and the structured-output schema the model
//! is held to.

use serde_json::{json, Value};

/// Executive-assistant instruction sent as the first part of every user
/// turn. Kept in Portuguese, the product's working language.
pub const SYSTEM_INSTRUCTION: &str = "\
ATUE COMO: um assistente executivo sênior responsável pelas atas da equipe.
Analise o registro desta reunião e produza a ata correspondente.

DIRETRIZES:
- Identifique o tópico principal e liste os assuntos discutidos.
- Ignore ruído: conversas paralelas, problemas de conexão, saudações.
- Registre as decisões tomadas, com responsáveis e prazos combinados.
- Destaque os itens de ação em uma lista própria.

SAÍDA OBRIGATÓRIA (JSON):
Retorne APENAS um objeto JSON com a estrutura abaixo, sem markdown em volta:
{
  \"category\": \"Uma categoria curta (ex: Alinhamento de cadastro)\",
  \"quickSummary\": \"Uma frase resumindo o tópico principal\",
  \"styledContent\": \"A ata completa formatada em HTML (use <h2>, <ul>, <strong>, etc) pronta para exibição em um site\"
}
";

/// generateContent `responseSchema` declaring the three required string
/// fields, so the structured-output contract is enforced server-side too.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": {
                "type": "STRING",
                "description": "Uma categoria curta para a reunião",
            },
            "quickSummary": {
                "type": "STRING",
                "description": "Uma frase resumindo o tópico principal",
            },
            "styledContent": {
                "type": "STRING",
                "description": "O conteúdo da ata formatado em HTML",
            },
        },
        "required": ["category", "quickSummary", "styledContent"],
    })
}
