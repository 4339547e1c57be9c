// src/categorias/categoria_structs.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::shared::erros::{AppError, ErroCampo};

const TAMANHO_MAXIMO_NOME: usize = 100;

/// Estrutura para receber dados de uma nova categoria na requisição POST/PUT
#[derive(Deserialize)]
pub struct NovaCategoria {
    #[serde(default)]
    pub nome_categoria: String,
    #[serde(default)]
    pub descricao: Option<String>,
}

impl NovaCategoria {
    /// Normaliza os campos (trim) e valida o nome.
    pub fn validar(self) -> Result<NovaCategoria, AppError> {
        let nome = self.nome_categoria.trim().to_string();
        let tamanho = nome.chars().count();
        if tamanho == 0 || tamanho > TAMANHO_MAXIMO_NOME {
            return Err(AppError::Validacao(vec![ErroCampo::new(
                "nome_categoria",
                format!("Nome da categoria deve ter entre 1 e {TAMANHO_MAXIMO_NOME} caracteres."),
            )]));
        }
        Ok(NovaCategoria {
            nome_categoria: nome,
            descricao: self
                .descricao
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}

/// Estrutura que representa uma categoria no banco de dados
#[derive(Debug, Serialize, FromRow)]
pub struct Categoria {
    pub id: i32,
    pub nome_categoria: String,
    pub descricao: Option<String>,
}
