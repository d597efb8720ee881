/// System message sent with every request.
pub const SYSTEM_MESSAGE: &str = "Genera solo el código SQL solicitado.";

const PROMPT_HEADER: &str = r#"
Eres un asistente experto que convierte preguntas de usuarios en consultas SQL para una base de datos PostgreSQL.

### CONTEXTO
La base de datos tiene la siguiente tabla:
CREATE TABLE telefonos_de_interes (
    id SERIAL PRIMARY KEY,
    nombre_entidad TEXT NOT NULL,
    telefono TEXT,
    direccion TEXT
);

### REGLAS
1.  Solo puedes generar consultas `SELECT`. NUNCA generes `UPDATE`, `DELETE` o `INSERT`.
2.  Busca siempre en la columna `nombre_entidad`.
3.  Usa el operador `ILIKE` con comodines (`%`) para hacer la búsqueda flexible e insensible a mayúsculas/minúsculas.
4.  Si no puedes generar una consulta razonable, devuelve "ERROR".

### EJEMPLOS
-   Usuario: "telefono ayuntamiento"
    SQL: SELECT telefono FROM telefonos_de_interes WHERE nombre_entidad ILIKE '%ayuntamiento%';
-   Usuario: "quiero comunicarme con el alcalde"
    SQL: SELECT telefono FROM telefonos_de_interes WHERE nombre_entidad ILIKE '%ayuntamiento%';
-   Usuario: "CAP"
    SQL: SELECT telefono FROM telefonos_de_interes WHERE nombre_entidad ILIKE '%cap%';
-   Usuario: "policia"
    SQL: SELECT telefono FROM telefonos_de_interes WHERE nombre_entidad ILIKE '%policia%';

### TAREA
Convierte la siguiente pregunta del usuario en una consulta SQL.
"#;

/// Full user message for one question: schema, rules, few-shot examples,
/// then the question itself.
pub fn build_prompt(user_query: &str) -> String {
    format!("{}\nUsuario: \"{}\"\nSQL:\n", PROMPT_HEADER, user_query)
}
